use bytes::Bytes;
use fraglink_binary::{BinaryReader, BinaryWriter};

use crate::error::{FrameError, Result};

/// Signature opening an unfragmented (direct) envelope.
pub const DIRECT_SIGNATURE: i32 = 1121;

/// Signature opening a fragment (header or body) of a chunked payload.
pub const FRAMED_SIGNATURE: i32 = 1122;

/// Default chunk size limit: 32 000 bytes.
///
/// Chosen to respect a legacy transport's per-message cap; callers with a
/// roomier transport should raise it rather than assume it.
pub const DEFAULT_CHUNK_LIMIT: usize = 32_000;

const KIND_HEADER: i32 = 0;
const KIND_BODY: i32 = 1;

/// Largest payload the i32 wire fields can describe.
const MAX_PAYLOAD: usize = i32::MAX as usize;

/// A parsed top-level message.
///
/// Wire format (all fields big-endian):
/// ```text
/// Direct:  signature(4) type_id(4) payload(...)
/// Header:  signature(4) stream_id(4) kind=0(4) total_size(4) chunk_count(4)
/// Body:    signature(4) stream_id(4) kind=1(4) index(4) data_len(4) data(...)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A complete payload delivered in one message.
    Direct {
        /// Which registered packet schema decodes the payload.
        type_id: i32,
        /// The packet's own schema-fixed encoding.
        payload: Bytes,
    },
    /// One fragment of a chunked payload.
    Framed(Frame),
}

/// One header or body unit of a fragmented payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Sender-assigned id grouping all fragments of one payload.
    pub stream_id: i32,
    pub kind: FrameKind,
}

/// The two frame kinds inside a framed envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameKind {
    /// Declares the reassembled payload's exact byte length and the
    /// number of body frames expected.
    Header { total_size: i32, chunk_count: i32 },
    /// One contiguous slice of the payload.
    Body { index: i32, data: Bytes },
}

impl Frame {
    /// Create a header frame.
    pub fn header(stream_id: i32, total_size: i32, chunk_count: i32) -> Self {
        Self {
            stream_id,
            kind: FrameKind::Header {
                total_size,
                chunk_count,
            },
        }
    }

    /// Create a body frame.
    pub fn body(stream_id: i32, index: i32, data: impl Into<Bytes>) -> Self {
        Self {
            stream_id,
            kind: FrameKind::Body {
                index,
                data: data.into(),
            },
        }
    }

    /// Encode this frame into a self-contained wire message.
    pub fn to_bytes(&self) -> Bytes {
        let mut writer = BinaryWriter::with_capacity(self.wire_size());
        writer.write_int(FRAMED_SIGNATURE);
        writer.write_int(self.stream_id);
        match &self.kind {
            FrameKind::Header {
                total_size,
                chunk_count,
            } => {
                writer.write_int(KIND_HEADER);
                writer.write_int(*total_size);
                writer.write_int(*chunk_count);
            }
            FrameKind::Body { index, data } => {
                writer.write_int(KIND_BODY);
                writer.write_int(*index);
                writer.write_byte_array(data);
            }
        }
        writer.into_bytes()
    }

    /// The total wire size of this frame once encoded.
    pub fn wire_size(&self) -> usize {
        match &self.kind {
            FrameKind::Header { .. } => 20,
            FrameKind::Body { data, .. } => 20 + data.len(),
        }
    }
}

/// Encode a direct envelope around an already-encoded payload.
pub fn encode_direct(type_id: i32, payload: &[u8]) -> Result<Bytes> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let mut writer = BinaryWriter::with_capacity(8 + payload.len());
    writer.write_int(DIRECT_SIGNATURE);
    writer.write_int(type_id);
    writer.write_raw(payload);
    Ok(writer.into_bytes())
}

/// Split a payload into one header frame plus body frames of at most
/// `chunk_size_limit` bytes each, the last possibly shorter.
///
/// Every frame is self-contained; nothing requires them to be produced,
/// transmitted, or consumed in the order returned.
pub fn chunk(stream_id: i32, payload: &[u8], chunk_size_limit: usize) -> Result<Vec<Frame>> {
    if chunk_size_limit == 0 {
        return Err(FrameError::InvalidChunkLimit);
    }
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let chunk_count = payload.len().div_ceil(chunk_size_limit);
    let mut frames = Vec::with_capacity(chunk_count + 1);
    frames.push(Frame::header(
        stream_id,
        payload.len() as i32,
        chunk_count as i32,
    ));
    for (index, slice) in payload.chunks(chunk_size_limit).enumerate() {
        frames.push(Frame::body(
            stream_id,
            index as i32,
            Bytes::copy_from_slice(slice),
        ));
    }
    Ok(frames)
}

/// Parse a top-level message.
///
/// Returns `Ok(None)` when the leading value is not one of the two
/// reserved signatures: the message belongs to some other protocol
/// sharing the transport and must be skipped, not decoded. Truncation or
/// an invalid frame kind after a recognized signature is an error.
pub fn parse_envelope(bytes: &[u8]) -> Result<Option<Envelope>> {
    if bytes.len() < 4 {
        return Ok(None); // Too short to carry a signature
    }

    let mut reader = BinaryReader::new(Bytes::copy_from_slice(bytes));
    let signature = reader.read_int()?;
    match signature {
        DIRECT_SIGNATURE => {
            let type_id = reader.read_int()?;
            let payload = reader.read_remaining();
            Ok(Some(Envelope::Direct { type_id, payload }))
        }
        FRAMED_SIGNATURE => {
            let stream_id = reader.read_int()?;
            let kind = match reader.read_int()? {
                KIND_HEADER => FrameKind::Header {
                    total_size: reader.read_int()?,
                    chunk_count: reader.read_int()?,
                },
                KIND_BODY => FrameKind::Body {
                    index: reader.read_int()?,
                    data: reader.read_byte_array()?,
                },
                other => return Err(FrameError::InvalidFrameKind(other)),
            };
            Ok(Some(Envelope::Framed(Frame { stream_id, kind })))
        }
        _ => Ok(None),
    }
}
