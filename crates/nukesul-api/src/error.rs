use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, TLS or timeout failure; no response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// The server rejected the bearer token (401/403).
    #[error("unauthorized ({status}) request to {url}: {message}")]
    Unauthorized {
        status: u16,
        url: String,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// An admin endpoint was called on a client without a token.
    #[error("no admin token; log in first")]
    MissingToken,

    /// The product image could not be attached to the upload.
    #[error("cannot attach image {path}: {reason}")]
    Image { path: String, reason: String },
}

impl ApiError {
    /// HTTP status code, when the server responded at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Unauthorized { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
