use thiserror::Error;

/// Errors surfaced by an [`InvocationClient`](crate::InvocationClient).
///
/// `KeyNotFound` is a protocol signal rather than a failure: callers are
/// expected to read it as "absent".
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Key not found")]
    KeyNotFound,

    #[error("Unexpected status {status} from {path}: {body}")]
    UnexpectedStatus {
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid sidecar url: {0}")]
    InvalidUrl(String),

    #[error("API token is not a valid header value")]
    InvalidApiToken,

    #[error("{0} is not a supported actor invocation method")]
    UnsupportedVerb(String),
}

impl ClientError {
    /// True when the error only means the requested key does not exist.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, ClientError::KeyNotFound)
    }
}
