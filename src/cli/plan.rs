//! The `plan` command: a dry run of the split pipeline.

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::pipeline::{self, PipelineOptions};
use crate::git::worktree::CliGit;
use crate::git::GitRepository;

/// Shows the proposed commit groups without committing anything.
#[derive(Parser)]
pub struct PlanCommand {
    /// Shared pipeline options.
    #[command(flatten)]
    pub options: PipelineOptions,

    /// Prints the proposal as JSON instead of the human-readable listing.
    #[arg(long)]
    pub json: bool,
}

impl PlanCommand {
    /// Executes the plan command.
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::open()?;
        if !repo.has_head() {
            anyhow::bail!("Repository has no commits yet; create an initial commit first");
        }

        let workdir = repo.workdir()?.to_path_buf();
        let git = CliGit::new(&workdir);

        let model = pipeline::resolve_model(self.options.model.clone());
        let grouping = pipeline::default_grouping_client(model)?;

        let Some(proposal) = pipeline::propose(&git, &grouping, &self.options).await? else {
            println!("No splittable changes found.");
            return Ok(());
        };

        if self.json {
            let rendered = serde_json::to_string_pretty(&proposal.groups)
                .context("Failed to serialize proposal")?;
            println!("{rendered}");
        } else {
            pipeline::print_proposal(&proposal);
            println!("Dry run only; run `git-weave split` to create the commits.");
        }

        Ok(())
    }
}
