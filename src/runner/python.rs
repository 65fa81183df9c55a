//! Runs a Beam python module against the Dataflow runner.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::args::LaunchArgs;
use crate::client::{DataflowConnector, RetryPolicy, RetryingDataflowClient};
use crate::config::{Config, CredentialStatus};
use crate::runner::error::LaunchError;
use crate::runner::resources::GcpResources;
use crate::runner::staging::Stager;
use crate::runner::{JobHandle, JobSubmitter};

/// Marker Beam prints in front of the monitoring URL of a new job.
const CONSOLE_JOB_URL: &str = "console.cloud.google.com/dataflow/jobs/";

/// Job location and id as printed in a Dataflow console URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleJobRef {
    pub location: String,
    pub job_id: String,
}

/// Finds `console.cloud.google.com/dataflow/jobs/<location>/<job_id>` in a
/// line of pipeline output.
pub fn extract_job_ref(line: &str) -> Option<ConsoleJobRef> {
    let start = line.find(CONSOLE_JOB_URL)? + CONSOLE_JOB_URL.len();
    let rest = &line[start..];

    let location = take_id_chars(rest);
    let rest = rest[location.len()..].strip_prefix('/')?;
    let job_id = take_id_chars(rest);

    if location.is_empty() || job_id.is_empty() {
        return None;
    }
    Some(ConsoleJobRef {
        location: location.to_string(),
        job_id: job_id.to_string(),
    })
}

fn take_id_chars(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Decodes `--args` into the positional arguments of the python module.
pub fn decode_job_args(raw: &str) -> Result<Vec<String>, LaunchError> {
    serde_json::from_str(raw).map_err(|source| LaunchError::InvalidArgs {
        value: raw.to_string(),
        source,
    })
}

/// Arguments after the interpreter: `-u <module> <job args> --runner ... <passthrough>`.
pub fn beam_command_args(
    module: &Path,
    job_args: &[String],
    launch: &LaunchArgs,
    requirements: Option<&Path>,
    passthrough: &[String],
) -> Vec<String> {
    let mut args = vec!["-u".to_string(), module.to_string_lossy().into_owned()];
    args.extend(job_args.iter().cloned());
    args.extend([
        "--runner".to_string(),
        "DataflowRunner".to_string(),
        "--project".to_string(),
        launch.project.clone(),
        "--region".to_string(),
        launch.location.clone(),
        "--temp_location".to_string(),
        launch.temp_location.clone(),
    ]);
    if let Some(requirements) = requirements {
        args.push("--requirements_file".to_string());
        args.push(requirements.to_string_lossy().into_owned());
    }
    args.extend(passthrough.iter().cloned());
    args
}

/// Launches Beam python pipelines with the Dataflow runner.
pub struct PythonJobRunner {
    config: Config,
}

impl PythonJobRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    async fn install_requirements(&self, requirements: &Path) -> Result<(), LaunchError> {
        let interpreter = &self.config.python.interpreter;
        info!(requirements = %requirements.display(), "Installing pipeline requirements");

        let status = Command::new(interpreter)
            .args(["-m", "pip", "install", "-r"])
            .arg(requirements)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| LaunchError::io(format!("Failed to start {}", interpreter), e))?;

        ensure_success(interpreter, status)
    }

    /// Runs the pipeline, logging its output, and returns the job it created.
    async fn run_pipeline(
        &self,
        args: Vec<String>,
        module: &str,
    ) -> Result<ConsoleJobRef, LaunchError> {
        let interpreter = &self.config.python.interpreter;
        debug!(program = %interpreter, ?args, "Starting pipeline process");

        let mut child = Command::new(interpreter)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::io(format!("Failed to start {}", interpreter), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (from_stdout, from_stderr, status) = tokio::join!(
            scan_output(stdout, "stdout"),
            scan_output(stderr, "stderr"),
            child.wait()
        );

        let status =
            status.map_err(|e| LaunchError::io(format!("Failed to wait for {}", interpreter), e))?;
        ensure_success(interpreter, status)?;

        let from_stdout = from_stdout.map_err(|e| LaunchError::io("Failed to read stdout", e))?;
        let from_stderr = from_stderr.map_err(|e| LaunchError::io("Failed to read stderr", e))?;

        from_stdout
            .or(from_stderr)
            .ok_or_else(|| LaunchError::JobIdNotFound {
                module: module.to_string(),
            })
    }

    /// Reads the job back through the retrying Dataflow client.
    async fn confirm(&self, job: &JobHandle) -> Result<(), LaunchError> {
        if let CredentialStatus::Unconfigured { reason } = self.config.auth.resolve_credential() {
            info!(job_id = %job.job_id, %reason, "No access token; skipping job confirmation");
            return Ok(());
        }

        let connector = DataflowConnector::from_config(&self.config);
        let policy = RetryPolicy::from(&self.config.retry);
        let mut client = RetryingDataflowClient::new(connector, policy)?;
        let found = client
            .get_job(&job.project, &job.location, &job.job_id)
            .await?;

        let state = found.current_state.as_deref().unwrap_or("JOB_STATE_UNKNOWN");
        if found.is_terminal() {
            warn!(job_id = %found.id, name = %found.name, state, "Dataflow job already finished");
        } else {
            info!(job_id = %found.id, name = %found.name, state, "Dataflow job confirmed");
        }
        Ok(())
    }
}

impl JobSubmitter for PythonJobRunner {
    async fn submit(
        &self,
        passthrough: &[String],
        launch: &LaunchArgs,
    ) -> Result<JobHandle, LaunchError> {
        let job_args = decode_job_args(&launch.args)?;

        let scratch = tempfile::tempdir()
            .map_err(|e| LaunchError::io("Failed to create staging directory", e))?;
        let mut stager = Stager::new(&self.config, scratch.path());

        let module = stager.stage(&launch.python_module_path).await?;
        let requirements = match &launch.requirements_file_path {
            Some(path) => Some(stager.stage(path).await?),
            None => None,
        };

        if let Some(requirements) = &requirements {
            self.install_requirements(requirements).await?;
        }

        let args = beam_command_args(
            &module,
            &job_args,
            launch,
            requirements.as_deref(),
            passthrough,
        );
        let console = self.run_pipeline(args, &launch.python_module_path).await?;

        let job = JobHandle {
            project: launch.project.clone(),
            location: console.location,
            job_id: console.job_id,
        };
        info!(
            project = %job.project,
            location = %job.location,
            job_id = %job.job_id,
            "Dataflow job created"
        );

        GcpResources::for_job(&self.config.dataflow.endpoint, &job)?
            .write_to(&launch.gcp_resources)?;
        info!(path = %launch.gcp_resources.display(), "Wrote gcp_resources");

        self.confirm(&job).await?;
        Ok(job)
    }
}

fn ensure_success(program: &str, status: ExitStatus) -> Result<(), LaunchError> {
    if status.success() {
        return Ok(());
    }
    warn!(program, %status, "Process exited unsuccessfully");
    Err(LaunchError::ProcessFailed {
        program: program.to_string(),
        status: status.to_string(),
    })
}

/// Logs every line of `reader` and returns the first job reference seen.
async fn scan_output<R>(
    reader: Option<R>,
    stream: &'static str,
) -> std::io::Result<Option<ConsoleJobRef>>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(None);
    };

    let mut lines = BufReader::new(reader).lines();
    let mut found = None;
    while let Some(line) = lines.next_line().await? {
        info!(stream, "{}", line);
        if found.is_none() {
            found = extract_job_ref(&line);
        }
    }
    Ok(found)
}
