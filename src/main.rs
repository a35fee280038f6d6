use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "autorun")]
#[command(
    version,
    about = "Drive a coding agent through a feature backlog, one feature per iteration"
)]
pub struct Cli {
    /// Show debug logs and the agent command line
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the loop against the backlog in a project directory
    Run {
        /// Project directory containing feature_list.json
        #[arg(default_value = ".")]
        project_dir: PathBuf,

        /// Override the iteration cap from .autorun.toml
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// Show completed and remaining features
    Status {
        #[arg(default_value = ".")]
        project_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    autorun::logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            project_dir,
            max_iterations,
        } => cmd::cmd_run(project_dir, cli.verbose, max_iterations).await?,
        Commands::Status { project_dir } => cmd::cmd_status(project_dir)?,
    }

    Ok(())
}
