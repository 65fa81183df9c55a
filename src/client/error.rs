use thiserror::Error;

use crate::client::retry::Transient;

/// Errors raised by the Google API clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The configured endpoint cannot have API paths joined onto it
    #[error("Invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Connection, timeout or body transfer failure
    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The API answered with a body that does not match the expected shape
    #[error("Failed to decode response from '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Transient for ClientError {
    fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport { source, .. } => !source.is_builder() && !source.is_decode(),
            ClientError::Build(_)
            | ClientError::InvalidEndpoint { .. }
            | ClientError::Api { .. }
            | ClientError::Decode { .. } => false,
        }
    }

    fn failure_class(&self) -> &'static str {
        match self {
            ClientError::Build(_) => "BuildError",
            ClientError::InvalidEndpoint { .. } => "EndpointError",
            ClientError::Transport { source, .. } if source.is_timeout() => "TimeoutError",
            ClientError::Transport { source, .. } if source.is_connect() => "ConnectionError",
            ClientError::Transport { .. } => "IoError",
            ClientError::Api { .. } => "ApiError",
            ClientError::Decode { .. } => "DecodeError",
        }
    }
}

impl ClientError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
