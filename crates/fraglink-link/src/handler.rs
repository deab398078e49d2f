use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use fraglink_binary::{BinaryReader, BinaryWriter};
use fraglink_frame::{
    chunk, encode_direct, parse_envelope, Assembler, Envelope, DEFAULT_CHUNK_LIMIT,
};
use tracing::{trace, warn};

use crate::error::{LinkError, Result};
use crate::packet::Packet;
use crate::registry::PacketRegistry;

/// Orchestrates the send and receive paths.
///
/// Sending is fire-and-forget: no acknowledgement, no retry, no
/// backpressure. The receive path is total — a single malformed or
/// adversarial input costs that one packet and nothing else.
pub struct PacketHandler {
    registry: Arc<PacketRegistry>,
    chunk_size_limit: usize,
    next_stream_id: AtomicI32,
}

impl PacketHandler {
    /// Create a handler over a shared decoder registry.
    pub fn new(registry: Arc<PacketRegistry>) -> Self {
        Self {
            registry,
            chunk_size_limit: DEFAULT_CHUNK_LIMIT,
            next_stream_id: AtomicI32::new(0),
        }
    }

    /// Override the chunk size limit used by `send`.
    pub fn with_chunk_size_limit(mut self, chunk_size_limit: usize) -> Self {
        self.chunk_size_limit = chunk_size_limit;
        self
    }

    /// The decoder registry this handler dispatches through.
    pub fn registry(&self) -> &PacketRegistry {
        &self.registry
    }

    /// The chunk size limit used by `send`.
    pub fn chunk_size_limit(&self) -> usize {
        self.chunk_size_limit
    }

    // Wraps silently on overflow; ids only need to be unique within the
    // window of concurrently in-flight streams on one link.
    fn next_stream_id(&self) -> i32 {
        self.next_stream_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Serialize and transmit a packet using the configured limit.
    pub fn send(&self, packet: &dyn Packet, transmit: impl FnMut(Bytes)) -> Result<()> {
        self.send_with_limit(packet, self.chunk_size_limit, transmit)
    }

    /// Serialize and transmit a packet with an explicit size limit.
    ///
    /// A payload within the limit goes out as one direct envelope;
    /// anything larger is chunked under a fresh stream id, one `transmit`
    /// call per frame. No ordering between the calls is promised — any
    /// ordering requirement belongs to the transport.
    pub fn send_with_limit(
        &self,
        packet: &dyn Packet,
        chunk_size_limit: usize,
        mut transmit: impl FnMut(Bytes),
    ) -> Result<()> {
        let mut writer = BinaryWriter::new();
        packet.encode(&mut writer);
        let message = encode_direct(Packet::type_id(packet), &writer.into_bytes())?;

        if message.len() <= chunk_size_limit {
            transmit(message);
            return Ok(());
        }

        let stream_id = self.next_stream_id();
        for frame in chunk(stream_id, &message, chunk_size_limit)? {
            transmit(frame.to_bytes());
        }
        Ok(())
    }

    /// Process one inbound transport message.
    ///
    /// This entrypoint never fails outward: malformed bytes, unknown
    /// type ids, and truncated frames are logged and dropped here so the
    /// host's receive loop survives adversarial input.
    pub fn receive(
        &self,
        bytes: &[u8],
        assembler: &Assembler,
        on_decoded: impl FnMut(Box<dyn Packet>),
    ) {
        if let Err(err) = self.try_receive(bytes, assembler, on_decoded) {
            warn!(error = %err, len = bytes.len(), "dropping undecodable inbound message");
        }
    }

    fn try_receive(
        &self,
        bytes: &[u8],
        assembler: &Assembler,
        mut on_decoded: impl FnMut(Box<dyn Packet>),
    ) -> Result<()> {
        match parse_envelope(bytes)? {
            None => {
                trace!(len = bytes.len(), "ignoring message with foreign signature");
            }
            Some(Envelope::Direct { type_id, payload }) => {
                self.dispatch(type_id, payload, &mut on_decoded)?;
            }
            Some(Envelope::Framed(frame)) => {
                if let Some(completed) = assembler.accept(frame) {
                    // The reassembled buffer is itself a direct envelope.
                    match parse_envelope(&completed)? {
                        Some(Envelope::Direct { type_id, payload }) => {
                            self.dispatch(type_id, payload, &mut on_decoded)?;
                        }
                        _ => return Err(LinkError::UnexpectedEnvelope),
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch(
        &self,
        type_id: i32,
        payload: Bytes,
        on_decoded: &mut impl FnMut(Box<dyn Packet>),
    ) -> Result<()> {
        let mut reader = BinaryReader::new(payload);
        let packet = self.registry.decode(type_id, &mut reader)?;
        on_decoded(packet);
        Ok(())
    }
}
