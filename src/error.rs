use thiserror::Error;

/// Errors surfaced by the API client and the task repository.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side validation failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The session token expired and could not be refreshed. The stored
    /// token has been cleared; the user must log in again.
    #[error("session expired, please log in again")]
    AuthExpired,

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// Local file I/O failed (token or category storage).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
