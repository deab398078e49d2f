/// Errors that can occur while encoding or decoding binary payloads.
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    /// The buffer ended before a complete value could be read.
    #[error("unexpected end of buffer (needed {needed} bytes, {remaining} remaining)")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A length or count prefix is negative outside a null-sentinel position.
    #[error("invalid length prefix: {0}")]
    InvalidLength(i32),

    /// A string field does not contain valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A tagged value carries a type tag outside the supported set.
    #[error("unknown value tag: {0}")]
    InvalidValueTag(i32),

    /// A char field is not a valid Unicode scalar value.
    #[error("invalid char scalar: {0:#x}")]
    InvalidChar(u32),

    /// A property map entry carries a null key.
    #[error("property entry {0} has a null key")]
    NullPropertyKey(usize),
}

pub type Result<T> = std::result::Result<T, BinaryError>;
