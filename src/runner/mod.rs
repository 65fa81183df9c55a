//! Job submission.
//!
//! [`JobSubmitter`] is the seam between argument parsing and the thing that
//! actually starts a Dataflow job; [`PythonJobRunner`] is the shipped
//! implementation.

mod error;
mod python;
mod resources;
mod staging;

pub use error::LaunchError;
pub use python::{
    beam_command_args, decode_job_args, extract_job_ref, ConsoleJobRef, PythonJobRunner,
};
pub use resources::{GcpResource, GcpResources, DATAFLOW_JOB_RESOURCE_TYPE};
pub use staging::{GcsPath, Stager};

use crate::args::LaunchArgs;
use crate::client::{job_resource_url, ClientError};

/// A launched Dataflow job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub project: String,
    pub location: String,
    pub job_id: String,
}

impl JobHandle {
    /// REST URI of the job under `dataflow_endpoint`.
    pub fn resource_uri(&self, dataflow_endpoint: &str) -> Result<String, ClientError> {
        job_resource_url(dataflow_endpoint, &self.project, &self.location, &self.job_id)
            .map(String::from)
    }
}

/// Starts a job from parsed launcher arguments plus pass-through tokens.
#[allow(async_fn_in_trait)]
pub trait JobSubmitter {
    async fn submit(
        &self,
        passthrough: &[String],
        launch: &LaunchArgs,
    ) -> Result<JobHandle, LaunchError>;
}
