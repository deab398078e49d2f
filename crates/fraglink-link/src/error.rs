use fraglink_binary::BinaryError;
use fraglink_frame::FrameError;

/// Errors that can occur in packet dispatch and link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Binary-layer decode failure.
    #[error("binary error: {0}")]
    Binary(#[from] BinaryError),

    /// Envelope or chunking failure.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// No decoder is registered for the given type id.
    #[error("unknown packet type id: {0}")]
    UnknownPacketType(i32),

    /// A reassembled payload did not contain a direct envelope.
    #[error("reassembled payload is not a direct envelope")]
    UnexpectedEnvelope,
}

pub type Result<T> = std::result::Result<T, LinkError>;
