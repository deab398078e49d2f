use fraglink_binary::BinaryError;

/// Errors that can occur while encoding or parsing envelopes and frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload failed to decode at the binary layer.
    #[error("malformed frame: {0}")]
    Binary(#[from] BinaryError),

    /// A framed envelope carries a frame kind that is neither header nor body.
    #[error("invalid frame kind: {0}")]
    InvalidFrameKind(i32),

    /// The payload exceeds what the i32 wire fields can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The chunk size limit must be at least one byte.
    #[error("chunk size limit must be non-zero")]
    InvalidChunkLimit,
}

pub type Result<T> = std::result::Result<T, FrameError>;
