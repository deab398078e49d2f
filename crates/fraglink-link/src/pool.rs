use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use fraglink_frame::Assembler;

/// Peer-identity keyed arena of assemblers.
///
/// Stream ids are assigned by a per-sender counter, so two independent
/// peers will eventually emit the same id. A process receiving from many
/// peers must therefore keep one assembler per peer; this pool is that
/// arena. Entries are created lazily and should be removed when a peer
/// disconnects.
pub struct AssemblerPool<K: Eq + Hash> {
    assemblers: DashMap<K, Arc<Assembler>>,
}

impl<K: Eq + Hash> AssemblerPool<K> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            assemblers: DashMap::new(),
        }
    }

    /// The assembler for a peer, created on first use.
    pub fn assembler(&self, peer: K) -> Arc<Assembler> {
        self.assemblers
            .entry(peer)
            .or_insert_with(|| Arc::new(Assembler::new()))
            .clone()
    }

    /// Drop a peer's assembler and any partial reassembly it holds.
    ///
    /// Call on peer disconnect; a peer that reconnects starts clean.
    pub fn remove(&self, peer: &K) -> bool {
        self.assemblers.remove(peer).is_some()
    }

    /// Run timeout eviction across every peer's assembler; returns the
    /// total number of streams evicted.
    pub fn cleanup(&self, timeout: Duration) -> usize {
        self.assemblers
            .iter()
            .map(|entry| entry.value().cleanup(timeout))
            .sum()
    }

    /// Number of peers with an assembler.
    pub fn len(&self) -> usize {
        self.assemblers.len()
    }

    /// True if no peer has an assembler.
    pub fn is_empty(&self) -> bool {
        self.assemblers.is_empty()
    }
}

impl<K: Eq + Hash> Default for AssemblerPool<K> {
    fn default() -> Self {
        Self::new()
    }
}
