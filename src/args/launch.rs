//! Launcher arguments: validation via clap, plus the output-path hook.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use crate::args::classifier::classify;
use crate::args::registry::flag_registry;

pub const PROGRAM_NAME: &str = "dataflow-launcher";

/// Dataflow python job launcher.
///
/// Any argument not listed below is forwarded unchanged to the Beam pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = PROGRAM_NAME, args_override_self = true)]
pub struct LaunchArgs {
    /// The project in which the job is launched.
    #[arg(long = "project")]
    pub project: String,

    /// The region in which the job is launched.
    #[arg(long = "location")]
    pub location: String,

    /// The local or GCS path to the python file to run.
    #[arg(long = "python_module_path")]
    pub python_module_path: String,

    /// A GCS path for Dataflow to stage temporary job files created during the
    /// execution of the pipeline.
    #[arg(long = "temp_location")]
    pub temp_location: String,

    /// The local or GCS path to the requirements file.
    #[arg(long = "requirements_file_path")]
    pub requirements_file_path: Option<String>,

    /// JSON list of args to pass to the python file.
    #[arg(long = "args")]
    pub args: String,

    /// Output path for the gcp_resources descriptor. Parent directories are
    /// created if missing.
    #[arg(long = "gcp_resources", value_parser = make_parent_dirs_and_return_path)]
    pub gcp_resources: PathBuf,
}

/// Launcher arguments plus everything that was not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub launch: LaunchArgs,
    /// Unrecognised tokens, in their original order.
    pub passthrough: Vec<String>,
}

impl LaunchArgs {
    /// Flag name → value for every flag that was supplied.
    pub fn named(&self) -> BTreeMap<&'static str, String> {
        let mut named = BTreeMap::new();
        named.insert("project", self.project.clone());
        named.insert("location", self.location.clone());
        named.insert("python_module_path", self.python_module_path.clone());
        named.insert("temp_location", self.temp_location.clone());
        if let Some(path) = &self.requirements_file_path {
            named.insert("requirements_file_path", path.clone());
        }
        named.insert("args", self.args.clone());
        named.insert(
            "gcp_resources",
            self.gcp_resources.to_string_lossy().into_owned(),
        );
        named
    }
}

/// Creates every missing parent directory of `path` and returns it unchanged.
pub fn make_parent_dirs_and_return_path(path: &str) -> Result<PathBuf, std::io::Error> {
    let path = PathBuf::from(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path)
}

/// Splits `raw_args` (without the program name) into launcher arguments and
/// pass-through tokens, validating the launcher part.
///
/// Fails with a usage error when a required flag or a flag value is missing.
pub fn parse_args(raw_args: &[String]) -> Result<ParsedArgs, clap::Error> {
    let classified = classify(raw_args, &flag_registry());
    let recognized = classified.recognized();

    let launch = LaunchArgs::try_parse_from(
        std::iter::once(PROGRAM_NAME.to_string()).chain(recognized),
    )?;

    Ok(ParsedArgs {
        launch,
        passthrough: classified.passthrough(),
    })
}

/// Whether `path` points into Cloud Storage rather than the local disk.
pub fn is_gcs_path(path: &str) -> bool {
    path.starts_with("gs://")
}
