//! Download all experiments and datasets for a Braintrust project as CSVs.
//!
//! Usage:
//!   braintrust-export --project-name NAME
//!   braintrust-export --project-id ID
//!
//! Requires BRAINTRUST_API_KEY in the environment or a local `.env`.

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing::info;

use braintrust_export::client::ProjectSelector;
use braintrust_export::config::Config;
use braintrust_export::{load_env, run_export};

#[derive(Parser)]
#[command(name = "braintrust-export")]
#[command(about = "Download all experiments and datasets for a project as CSVs", long_about = None)]
#[command(group(
    ArgGroup::new("project")
        .required(true)
        .args(["project_id", "project_name"])
))]
struct Cli {
    /// The project ID to filter objects
    #[arg(long)]
    project_id: Option<String>,

    /// The project name to filter objects
    #[arg(long)]
    project_name: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("braintrust_export=info")),
        )
        .init();

    let cli = Cli::parse();
    load_env();

    // clap enforces the group too; the library check is authoritative.
    let selector = ProjectSelector::from_options(cli.project_id, cli.project_name)?;
    let config = Config::load()?;

    let stats = run_export(&config, &selector)?;
    info!("Data download completed successfully");
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
