//! Error types for the protocol layer.

/// Errors that can occur while interpreting wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The bytes are not a valid frame (malformed or truncated).
    #[error("decode failed: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The frame decoded but violates a protocol rule — e.g. an empty
    /// oneof where a kind is required, or a request with no call.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
