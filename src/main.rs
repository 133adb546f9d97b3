// Stackdraft command line entry point

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stackdraft::handler::{handle, InvocationEvent};
use stackdraft::models::document::input_name_from_key;
use stackdraft::storage::ConfigService;
use stackdraft::JobRunner;

#[derive(Parser, Debug)]
#[command(
    name = "stackdraft",
    version,
    about = "Generate CloudFormation templates from diagrams and parameter sheets from templates."
)]
struct Cli {
    /// Path to config.json (defaults plus environment overrides when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a template from an architecture diagram
    Template {
        /// Diagram image (png, jpeg, gif or webp)
        #[arg(long)]
        image: PathBuf,
        /// Artifact name prefix; defaults to the image file stem
        #[arg(long)]
        name: Option<String>,
    },
    /// Generate a parameter sheet from a template
    Paramsheet {
        #[arg(long)]
        template: PathBuf,
        /// Sample sheet; defaults to the configured one
        #[arg(long)]
        sample_sheet: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Run the handler on an object-upload event (`-` reads stdin)
    Invoke {
        #[arg(long)]
        event: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "stackdraft: failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = ConfigService::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    let runner = JobRunner::from_config(config.get_config())
        .context("failed to set up job runner")?;

    match cli.command {
        Command::Template { image, name } => {
            let name = name.unwrap_or_else(|| default_name(&image));
            let artifact = runner.run_template(&image, &name).await?;
            println!("{}", serde_json::to_string_pretty(&artifact)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Paramsheet {
            template,
            sample_sheet,
            name,
        } => {
            let sample = sample_sheet
                .or_else(|| runner.sample_sheet().map(Path::to_path_buf))
                .context("no sample sheet given and none configured")?;
            let name = name.unwrap_or_else(|| default_name(&template));
            let artifact = runner
                .run_parameter_sheet(&template, &sample, &name)
                .await?;
            println!("{}", serde_json::to_string_pretty(&artifact)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Invoke { event } => {
            let raw = if event == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&event)
                    .with_context(|| format!("failed to read event file {}", event))?
            };
            let event: InvocationEvent =
                serde_json::from_str(&raw).context("event is not a valid notification")?;
            let response = handle(&runner, &event).await;
            println!("{}", serde_json::to_string(&response)?);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn default_name(path: &Path) -> String {
    input_name_from_key(&path.to_string_lossy())
}
