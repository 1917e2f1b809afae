//! Error types for MIME parsing.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a raw message cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Content-Type value without a `type/subtype` pair.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Multipart content type without a boundary parameter.
    #[error("Missing boundary in multipart message")]
    MissingBoundary,

    /// Multipart entities nested past the supported depth.
    #[error("Multipart nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Input had no header block at all.
    #[error("Message has no headers")]
    EmptyMessage,
}
