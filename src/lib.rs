//! Launcher for Python Apache Beam pipelines on Google Cloud Dataflow.
//!
//! - [`args`] splits the command line into launcher flags and pass-through tokens.
//! - [`runner`] stages inputs, runs the pipeline and records the created job.
//! - [`client`] talks to the Dataflow and Cloud Storage REST APIs through a
//!   rebuild-and-retry wrapper.

pub mod args;
pub mod client;
pub mod config;
pub mod logging;
pub mod runner;

pub use args::{parse_args, LaunchArgs, ParsedArgs};
pub use runner::{JobHandle, JobSubmitter, LaunchError, PythonJobRunner};

/// Parses `raw_args`, then builds a submitter with `make_submitter` and hands
/// it the result.
///
/// Parsing happens once, before the submitter (and whatever config it loads)
/// exists. Usage errors come back as `clap::Error` wrapped in `anyhow` so the
/// caller can print them with clap's own formatting.
pub async fn launch<S, F>(raw_args: &[String], make_submitter: F) -> anyhow::Result<JobHandle>
where
    S: JobSubmitter,
    F: FnOnce() -> anyhow::Result<S>,
{
    let parsed = parse_args(raw_args)?;
    let submitter = make_submitter()?;
    let job = submitter
        .submit(&parsed.passthrough, &parsed.launch)
        .await?;
    Ok(job)
}
