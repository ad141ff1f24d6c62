//! Error types for the socket pair.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MocketError>;

/// Errors surfaced by the socket pair.
///
/// The double fails fast: a payload-copy failure propagates directly to
/// whichever `emit` triggered it, and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum MocketError {
    /// Encoding or decoding a payload during the deep-copy round trip failed.
    #[error("payload round trip failed: {0}")]
    Payload(#[from] serde_json::Error),

    /// The client endpoint outlived its paired server endpoint.
    #[error("server endpoint has been dropped")]
    Detached,
}
