use dataflow_launcher::config::Config;
use dataflow_launcher::logging::init_tracing;
use dataflow_launcher::{launch, PythonJobRunner};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let runner_from_config =
        || -> anyhow::Result<PythonJobRunner> { Ok(PythonJobRunner::new(Config::load()?)) };

    match launch(&raw_args, runner_from_config).await {
        Ok(job) => {
            info!(
                project = %job.project,
                location = %job.location,
                job_id = %job.job_id,
                "Launch complete"
            );
            Ok(())
        }
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(usage) => usage.exit(),
            Err(err) => Err(err),
        },
    }
}
