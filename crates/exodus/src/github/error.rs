use thiserror::Error;

/// Errors from the target host.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Http(String),

    /// A response body could not be decoded.
    #[error("unexpected response: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("GitHub returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The import API refused the start request. The raw body is kept
    /// verbatim so the operator can diagnose the remote-side rejection.
    #[error("import request rejected with HTTP {status}: {body}")]
    ImportRejected { status: u16, body: String },

    /// The import never reported `complete` within the poll budget.
    #[error("import still \"{last_status}\" after {attempts} status polls")]
    ImportTimeout { attempts: u32, last_status: String },
}
