//! Reassembly of chunked payloads.
//!
//! Frames may arrive in any order, duplicated, or never at all. Each
//! stream id accumulates state until its header is present and every
//! body index is covered, at which point the payload is handed back
//! exactly once and the state discarded. Abandoned streams are bounded
//! in lifetime by `cleanup`, which an external scheduler must drive; the
//! assembler keeps no timers of its own.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::envelope::{Frame, FrameKind};

#[derive(Debug, Clone, Copy)]
struct HeaderInfo {
    total_size: i32,
    chunk_count: i32,
}

/// Accumulated state for one in-flight stream.
struct Transfer {
    header: Option<HeaderInfo>,
    chunks: HashMap<i32, Bytes>,
    last_update: Instant,
}

impl Transfer {
    fn new() -> Self {
        Self {
            header: None,
            chunks: HashMap::new(),
            last_update: Instant::now(),
        }
    }

    fn apply(&mut self, kind: FrameKind) {
        self.last_update = Instant::now();
        match kind {
            FrameKind::Header {
                total_size,
                chunk_count,
            } => {
                if total_size < 0 || chunk_count < 0 {
                    debug!(total_size, chunk_count, "discarding invalid header frame");
                    return;
                }
                self.header = Some(HeaderInfo {
                    total_size,
                    chunk_count,
                });
                // Chunks stored before the header arrived may now be
                // out of range; a stray index must not satisfy the
                // completion count.
                self.chunks.retain(|&index, _| index < chunk_count);
            }
            FrameKind::Body { index, data } => {
                if index < 0 {
                    debug!(index, "discarding body frame with negative index");
                    return;
                }
                if let Some(header) = self.header {
                    if index >= header.chunk_count {
                        debug!(
                            index,
                            chunk_count = header.chunk_count,
                            "discarding out-of-range body frame"
                        );
                        return;
                    }
                }
                // Duplicate index: last write wins.
                self.chunks.insert(index, data);
            }
        }
    }

    fn is_complete(&self) -> bool {
        matches!(self.header, Some(header) if self.chunks.len() == header.chunk_count as usize)
    }

    /// Concatenate chunks by ascending index. Returns `None` if any index
    /// is missing; the count check alone cannot prove contiguity.
    fn assemble(&self) -> Option<Bytes> {
        let header = self.header?;
        let mut buf = BytesMut::with_capacity(header.total_size as usize);
        for index in 0..header.chunk_count {
            buf.extend_from_slice(self.chunks.get(&index)?);
        }
        Some(buf.freeze())
    }
}

/// Per-stream reassembly state machine.
///
/// `accept` may be called concurrently from any number of delivery
/// threads, for the same or different streams, with `cleanup` racing
/// against them. Stream ids are only unique per sender: scope one
/// assembler per logical peer, never one global assembler across peers
/// with independent counters.
pub struct Assembler {
    streams: DashMap<i32, Transfer>,
}

impl Assembler {
    /// Create an assembler with no in-flight streams.
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }

    /// Feed one frame; returns the reassembled payload when this frame
    /// completes its stream, `None` while the stream is still incomplete.
    ///
    /// Completion removes the stream's state before the payload is
    /// returned, under the stream's map lock, so racing calls on the
    /// final frames observe completion at most once.
    pub fn accept(&self, frame: Frame) -> Option<Bytes> {
        match self.streams.entry(frame.stream_id) {
            Entry::Occupied(mut occupied) => {
                let completed = {
                    let transfer = occupied.get_mut();
                    transfer.apply(frame.kind);
                    // An index hole despite a matching count would mean a
                    // corrupted stream; keep the state rather than panic.
                    if transfer.is_complete() {
                        transfer.assemble()
                    } else {
                        None
                    }
                };
                if let Some(payload) = completed {
                    occupied.remove();
                    return Some(payload);
                }
                None
            }
            Entry::Vacant(vacant) => {
                let mut transfer = Transfer::new();
                transfer.apply(frame.kind);
                // A zero-chunk header completes on arrival.
                if transfer.is_complete() {
                    if let Some(payload) = transfer.assemble() {
                        return Some(payload);
                    }
                }
                vacant.insert(transfer);
                None
            }
        }
    }

    /// Evict streams that have received no frame for longer than
    /// `timeout`, discarding their accumulated chunks. Returns the number
    /// of streams evicted.
    pub fn cleanup(&self, timeout: Duration) -> usize {
        let mut evicted = 0usize;
        self.streams.retain(|&stream_id, transfer| {
            let keep = transfer.last_update.elapsed() <= timeout;
            if !keep {
                evicted += 1;
                debug!(
                    stream_id,
                    chunks = transfer.chunks.len(),
                    "evicting stalled reassembly stream"
                );
            }
            keep
        });
        evicted
    }

    /// Number of streams currently mid-reassembly.
    pub fn in_flight(&self) -> usize {
        self.streams.len()
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}
