use std::path::PathBuf;

use thiserror::Error;

use crate::client::ClientError;

/// Errors that can occur while launching a job.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// `--args` is not a JSON list of strings
    #[error("Invalid --args value '{value}': expected a JSON list of strings ({source})")]
    InvalidArgs {
        value: String,
        #[source]
        source: serde_json::Error,
    },

    /// A `gs://` path that cannot be split into bucket and object
    #[error("Invalid GCS path '{path}'")]
    InvalidGcsPath { path: String },

    /// Local file system failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A child process exited unsuccessfully
    #[error("'{program}' exited with {status}")]
    ProcessFailed { program: String, status: String },

    /// The pipeline finished without printing a Dataflow job URL
    #[error("No Dataflow job id found in the output of '{module}'")]
    JobIdNotFound { module: String },

    /// Failed to write the gcp_resources descriptor
    #[error("Failed to write gcp_resources to '{path}': {source}")]
    WriteResources {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Google API failure (staging download or job confirmation)
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl LaunchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        LaunchError::Io {
            context: context.into(),
            source,
        }
    }
}
