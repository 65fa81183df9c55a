//! Google API clients and the retry wrapper they run under.
//!
//! ```text
//! Connector::connect → client handle → RetryingClient::call(op) → retry / rebuild
//! ```

mod dataflow;
mod error;
mod retry;
mod storage;

pub use dataflow::{
    job_resource_url, DataflowClient, DataflowConnector, Job, RetryingDataflowClient,
};
pub use error::ClientError;
pub use retry::{Connector, RetryPolicy, RetryingClient, Transient};
pub use storage::{RetryingStorageClient, StorageClient, StorageConnector};

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::SecureString;

/// Longest slice of an error body kept in `ClientError::Api` messages.
const ERROR_BODY_PREVIEW_CHARS: usize = 512;

/// Everything needed to (re)build an HTTP handle for one Google API.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Scheme + host, without a trailing slash.
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub token: Option<SecureString>,
}

impl ApiSettings {
    pub fn new(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            connect_timeout,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<SecureString>) -> Self {
        self.token = token;
        self
    }

    /// `endpoint` with each of `segments` appended as an encoded path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        endpoint_url(&self.endpoint, segments)
    }

    fn build_http(&self) -> Result<Client, ClientError> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(ClientError::Build)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }
}

/// Sends `builder` and returns the raw body of a successful response.
async fn send(builder: RequestBuilder, url: &str) -> Result<Vec<u8>, ClientError> {
    let response = builder.send().await.map_err(|source| ClientError::Transport {
        url: url.to_string(),
        source,
    })?;
    read_body(response, url).await
}

/// Sends `builder` and decodes a successful JSON response.
async fn send_json<T: DeserializeOwned>(
    builder: RequestBuilder,
    url: &str,
) -> Result<T, ClientError> {
    let body = send(builder, url).await?;
    serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

async fn read_body(response: Response, url: &str) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&bytes),
        });
    }

    Ok(bytes.to_vec())
}

/// Pulls `error.message` out of a Google API error body, falling back to a
/// truncated copy of the raw body.
fn error_message(body: &[u8]) -> String {
    let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return message.to_string();
    }

    let raw = String::from_utf8_lossy(body);
    raw.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}

/// Appends `segments` to the path of `endpoint`. Each segment is
/// percent-encoded on its own, so a `/` inside one stays part of it.
pub(crate) fn endpoint_url(endpoint: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
