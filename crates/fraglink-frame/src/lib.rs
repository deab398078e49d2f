//! Envelope wire format and chunk reassembly for fraglink.
//!
//! Transports cap individual message size; payloads do not care. This
//! crate splits an oversized payload into self-contained frames on the
//! sending side and reassembles them — tolerating reordering and
//! duplication — on the receiving side, with timeout-based eviction
//! bounding the memory held for abandoned transfers.

pub mod assembler;
pub mod envelope;
pub mod error;

pub use assembler::Assembler;
pub use envelope::{
    chunk, encode_direct, parse_envelope, Envelope, Frame, FrameKind, DEFAULT_CHUNK_LIMIT,
    DIRECT_SIGNATURE, FRAMED_SIGNATURE,
};
pub use error::{FrameError, Result};
