//! Dataflow v1b3 REST client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::retry::{Connector, RetryingClient};
use crate::client::{endpoint_url, send_json, ApiSettings, ClientError};
use crate::config::Config;

/// The subset of the Dataflow `Job` resource the launcher reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl Job {
    /// Whether the job has reached a state it will not leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.current_state.as_deref(),
            Some(
                "JOB_STATE_DONE"
                    | "JOB_STATE_FAILED"
                    | "JOB_STATE_CANCELLED"
                    | "JOB_STATE_UPDATED"
                    | "JOB_STATE_DRAINED"
            )
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListJobsResponse {
    #[serde(default)]
    jobs: Vec<Job>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobStateUpdate<'a> {
    requested_state: &'a str,
}

/// Builds [`DataflowClient`] handles.
#[derive(Debug, Clone)]
pub struct DataflowConnector {
    settings: ApiSettings,
}

impl DataflowConnector {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    /// Endpoint and timeouts from `[dataflow]`, token from `[auth]`.
    pub fn from_config(config: &Config) -> Self {
        let settings = ApiSettings::new(
            &config.dataflow.endpoint,
            config.dataflow.timeout(),
            config.dataflow.connect_timeout(),
        )
        .with_token(config.auth.resolve_credential().token());
        Self::new(settings)
    }
}

impl Connector for DataflowConnector {
    type Client = DataflowClient;
    type Error = ClientError;

    fn connect(&self) -> Result<DataflowClient, ClientError> {
        Ok(DataflowClient {
            http: self.settings.build_http()?,
            settings: self.settings.clone(),
        })
    }
}

/// A handle onto the Dataflow REST API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DataflowClient {
    http: Client,
    settings: ApiSettings,
}

/// REST URL of one job: `{endpoint}/v1b3/projects/{p}/locations/{l}/jobs/{id}`.
pub fn job_resource_url(
    endpoint: &str,
    project: &str,
    location: &str,
    job_id: &str,
) -> Result<Url, ClientError> {
    endpoint_url(
        endpoint,
        &["v1b3", "projects", project, "locations", location, "jobs", job_id],
    )
}

impl DataflowClient {
    fn jobs_url(&self, project: &str, location: &str) -> Result<Url, ClientError> {
        self.settings
            .url(&["v1b3", "projects", project, "locations", location, "jobs"])
    }

    fn job_url(&self, project: &str, location: &str, job_id: &str) -> Result<Url, ClientError> {
        job_resource_url(&self.settings.endpoint, project, location, job_id)
    }

    /// `GET projects/{project}/locations/{location}/jobs/{job_id}`
    pub async fn get_job(
        &self,
        project: &str,
        location: &str,
        job_id: &str,
    ) -> Result<Job, ClientError> {
        let url = self.job_url(project, location, job_id)?;
        let request = self.settings.authorize(self.http.get(url.clone()));
        send_json(request, url.as_str()).await
    }

    /// Lists every job in the location, following `nextPageToken`.
    pub async fn list_jobs(&self, project: &str, location: &str) -> Result<Vec<Job>, ClientError> {
        let base = self.jobs_url(project, location)?;
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = base.clone();
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            let request = self.settings.authorize(self.http.get(url.clone()));
            let page: ListJobsResponse = send_json(request, url.as_str()).await?;
            jobs.extend(page.jobs);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(jobs),
            }
        }
    }

    /// Requests cancellation by moving the job to `JOB_STATE_CANCELLED`.
    pub async fn cancel_job(
        &self,
        project: &str,
        location: &str,
        job_id: &str,
    ) -> Result<Job, ClientError> {
        let url = self.job_url(project, location, job_id)?;
        let body = JobStateUpdate {
            requested_state: "JOB_STATE_CANCELLED",
        };
        let request = self.settings.authorize(self.http.put(url.clone()).json(&body));
        send_json(request, url.as_str()).await
    }
}

/// Dataflow client with every operation routed through the retry wrapper.
pub type RetryingDataflowClient = RetryingClient<DataflowConnector>;

impl RetryingClient<DataflowConnector> {
    pub async fn get_job(
        &mut self,
        project: &str,
        location: &str,
        job_id: &str,
    ) -> Result<Job, ClientError> {
        self.call(|client| async move { client.get_job(project, location, job_id).await })
            .await
    }

    pub async fn list_jobs(&mut self, project: &str, location: &str) -> Result<Vec<Job>, ClientError> {
        self.call(|client| async move { client.list_jobs(project, location).await })
            .await
    }

    pub async fn cancel_job(
        &mut self,
        project: &str,
        location: &str,
        job_id: &str,
    ) -> Result<Job, ClientError> {
        self.call(|client| async move { client.cancel_job(project, location, job_id).await })
            .await
    }
}
