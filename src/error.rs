use thiserror::Error;

/// Error type for glassfeed operations.
///
/// - `Request` — network/transport errors (wraps `reqwest::Error`); the
///   per-attempt request timeout surfaces here too
/// - `Http` — non-2xx upstream status, either immediately (4xx other than
///   429) or after the retry policy is exhausted (5xx/429)
/// - `Decode` — response body did not match the expected wire shape
/// - `BridgeInit` — non-zero result code from the bridge startup call
/// - `Bridge` — render or storage rejection from the bridge
#[derive(Debug, Error)]
pub enum GlassFeedError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Bridge startup failed with result code {code}")]
    BridgeInit { code: i32 },

    #[error("Bridge error: {message}")]
    Bridge { message: String },
}

pub type Result<T> = std::result::Result<T, GlassFeedError>;
