//! Cloud Storage JSON API client, used to stage `gs://` inputs locally.

use reqwest::Client;
use url::Url;

use crate::client::retry::{Connector, RetryingClient};
use crate::client::{send, ApiSettings, ClientError};
use crate::config::Config;

/// Builds [`StorageClient`] handles.
#[derive(Debug, Clone)]
pub struct StorageConnector {
    settings: ApiSettings,
}

impl StorageConnector {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        let settings = ApiSettings::new(
            &config.dataflow.storage_endpoint,
            config.dataflow.timeout(),
            config.dataflow.connect_timeout(),
        )
        .with_token(config.auth.resolve_credential().token());
        Self::new(settings)
    }
}

impl Connector for StorageConnector {
    type Client = StorageClient;
    type Error = ClientError;

    fn connect(&self) -> Result<StorageClient, ClientError> {
        Ok(StorageClient {
            http: self.settings.build_http()?,
            settings: self.settings.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageClient {
    http: Client,
    settings: ApiSettings,
}

impl StorageClient {
    fn media_url(&self, bucket: &str, object: &str) -> Result<Url, ClientError> {
        let mut url = self
            .settings
            .url(&["storage", "v1", "b", bucket, "o", object])?;
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    /// Downloads the contents of `gs://{bucket}/{object}`.
    pub async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.media_url(bucket, object)?;
        let request = self.settings.authorize(self.http.get(url.clone()));
        send(request, url.as_str()).await
    }
}

pub type RetryingStorageClient = RetryingClient<StorageConnector>;

impl RetryingClient<StorageConnector> {
    pub async fn download(&mut self, bucket: &str, object: &str) -> Result<Vec<u8>, ClientError> {
        self.call(|client| async move { client.download(bucket, object).await })
            .await
    }
}
