//! The `gcp_resources` descriptor handed back to the caller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::runner::error::LaunchError;
use crate::runner::JobHandle;

pub const DATAFLOW_JOB_RESOURCE_TYPE: &str = "DataflowJob";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpResources {
    pub resources: Vec<GcpResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpResource {
    pub resource_type: String,
    pub resource_uri: String,
}

impl GcpResources {
    /// Descriptor pointing at a single Dataflow job.
    pub fn for_job(dataflow_endpoint: &str, job: &JobHandle) -> Result<Self, LaunchError> {
        Ok(Self {
            resources: vec![GcpResource {
                resource_type: DATAFLOW_JOB_RESOURCE_TYPE.to_string(),
                resource_uri: job.resource_uri(dataflow_endpoint)?,
            }],
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<(), LaunchError> {
        let json = serde_json::to_string(self).map_err(|e| LaunchError::WriteResources {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|source| LaunchError::WriteResources {
            path: path.to_path_buf(),
            source,
        })
    }
}
