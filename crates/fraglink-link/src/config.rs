use std::time::Duration;

use fraglink_frame::DEFAULT_CHUNK_LIMIT;

/// Controls chunking and reassembly housekeeping for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Largest message handed to the transport in one call; anything
    /// bigger is chunked. Default: 32 000 bytes (a legacy transport's
    /// per-message cap — raise it when the transport allows).
    pub chunk_size_limit: usize,
    /// Idle age after which a partial reassembly is discarded. The host
    /// scheduler should call `Link::cleanup` at least this often.
    pub reassembly_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            chunk_size_limit: DEFAULT_CHUNK_LIMIT,
            reassembly_timeout: Duration::from_secs(10),
        }
    }
}
