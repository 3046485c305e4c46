//! `modelpack` - bake a pre-fetched Ollama model into a container image and
//! export it as an archive for offline servers.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};

use modelpack::config::{self, Config, Overrides};
use modelpack::docker::DockerCli;
use modelpack::telemetry;
use modelpack::workflow::{BuildReport, WorkflowInput, run_workflow};

#[derive(Parser)]
#[command(name = "modelpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prepare an Ollama image with a pre-fetched model for offline use", long_about = None)]
struct Cli {
    /// Model to fetch (e.g. deepseek-r1:1.5b, deepseek-r1:8b, deepseek-r1:14b)
    #[arg(long)]
    model: Option<String>,

    /// Path of the .tar file the image is exported to
    #[arg(long)]
    output: Option<PathBuf>,

    /// Name of the resulting image (default: ollama-with-<model>)
    #[arg(long)]
    image_name: Option<String>,

    /// Runtime image the model is fetched into
    #[arg(long)]
    base_image: Option<String>,

    /// Config file (default: .modelpack.yaml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Docker daemon socket, e.g. unix:///var/run/docker.sock
    #[arg(long)]
    docker_host: Option<String>,

    /// Seconds allowed for each container lifecycle request
    #[arg(long)]
    timeout: Option<u64>,

    /// Write a JSON build report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_image: self.base_image.clone(),
            model: self.model.clone(),
            output: self.output.clone(),
            image_name: self.image_name.clone(),
            docker_host: self.docker_host.clone(),
            docker_timeout: self.timeout,
        }
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => config::load_file(path),
            None => {
                let cwd = std::env::current_dir().context("failed to read current directory")?;
                config::load(&cwd)
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(cli.json, level);

    let cfg = cli.load_config()?.apply(cli.overrides());
    let input = WorkflowInput::from_config(&cfg)?;
    info!(model = %input.model, image = %input.image_name, "starting build");

    let engine = DockerCli::new(
        cfg.docker_binary.clone(),
        cfg.docker_host.as_deref(),
        cfg.timeout(),
    );
    engine
        .ensure_available()
        .context("docker daemon is not reachable")?;

    let stdout = io::stdout();
    let report = run_workflow(&engine, &input, &mut stdout.lock())?;

    if let Some(path) = &cli.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn write_report(path: &Path, report: &BuildReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(())
}
