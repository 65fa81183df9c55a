//! Makes the module and requirements files available on the local disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::args::is_gcs_path;
use crate::client::{RetryPolicy, RetryingStorageClient, StorageConnector};
use crate::config::Config;
use crate::runner::error::LaunchError;

/// `gs://{bucket}/{object}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsPath {
    pub bucket: String,
    pub object: String,
}

impl GcsPath {
    pub fn parse(path: &str) -> Result<Self, LaunchError> {
        let invalid = || LaunchError::InvalidGcsPath {
            path: path.to_string(),
        };
        let rest = path.strip_prefix("gs://").ok_or_else(invalid)?;
        let (bucket, object) = rest.split_once('/').ok_or_else(invalid)?;
        if bucket.is_empty() || object.is_empty() || object.ends_with('/') {
            return Err(invalid());
        }
        Ok(Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })
    }

    /// Last path component of the object name.
    pub fn file_name(&self) -> &str {
        self.object.rsplit('/').next().unwrap_or(&self.object)
    }
}

/// Downloads `gs://` inputs into a scratch directory; local paths pass through.
pub struct Stager<'a> {
    config: &'a Config,
    dir: PathBuf,
    client: Option<RetryingStorageClient>,
}

impl<'a> Stager<'a> {
    pub fn new(config: &'a Config, dir: &Path) -> Self {
        Self {
            config,
            dir: dir.to_path_buf(),
            client: None,
        }
    }

    /// Local path for `path`, downloading it first when it lives in GCS.
    pub async fn stage(&mut self, path: &str) -> Result<PathBuf, LaunchError> {
        if !is_gcs_path(path) {
            return Ok(PathBuf::from(path));
        }

        let gcs = GcsPath::parse(path)?;
        let client = match self.client.take() {
            Some(client) => client,
            None => {
                let connector = StorageConnector::from_config(self.config);
                let policy = RetryPolicy::from(&self.config.retry);
                RetryingStorageClient::new(connector, policy)?
            }
        };
        let client = self.client.insert(client);

        let bytes = client.download(&gcs.bucket, &gcs.object).await?;
        let target = self.dir.join(gcs.file_name());
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| LaunchError::io(format!("Failed to write {}", target.display()), e))?;

        info!(
            source = path,
            target = %target.display(),
            bytes = bytes.len(),
            "Staged file from GCS"
        );
        Ok(target)
    }
}
