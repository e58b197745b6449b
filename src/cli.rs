//! CLI interface for git-weave.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod pipeline;
pub mod plan;
pub mod split;

pub use plan::PlanCommand;
pub use split::SplitCommand;

/// git-weave: weaves working-tree changes into logical git commits.
#[derive(Parser)]
#[command(name = "git-weave")]
#[command(about = "Weaves working-tree changes into logical git commits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Splits uncommitted changes into AI-grouped commits.
    Split(SplitCommand),
    /// Shows the proposed commit groups without committing anything.
    Plan(PlanCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Split(split_cmd) => split_cmd.execute().await,
            Commands::Plan(plan_cmd) => plan_cmd.execute().await,
        }
    }
}
