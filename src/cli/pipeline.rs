//! Shared pipeline steps for the `split` and `plan` commands.

use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::ai::anthropic::DEFAULT_MODEL;
use crate::ai::{AnthropicClient, GroupingClient, OracleError, UnitGroup};
use crate::git::diff::{parse_units, unsplittable_paths, DiffUnit};
use crate::git::worktree::GitBackend;
use crate::utils::settings;

/// Options shared by `split` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct PipelineOptions {
    /// AI model to use (if not specified, uses GIT_WEAVE_MODEL or the default).
    #[arg(long)]
    pub model: Option<String>,

    /// Number of context lines in the generated diff.
    #[arg(long, default_value_t = 3)]
    pub context_lines: u32,

    /// Extra grouping instructions passed to the model.
    #[arg(long)]
    pub instructions: Option<String>,

    /// Registers untracked files (git add --intent-to-add) so they are
    /// included in the split.
    #[arg(long)]
    pub include_untracked: bool,
}

/// Everything gathered before the commit step.
pub struct Proposal {
    /// The full raw diff the units were parsed from.
    pub raw_diff: String,
    /// Parsed diff units, in original diff order.
    pub units: Vec<DiffUnit>,
    /// Validated, coverage-repaired commit groups.
    pub groups: Vec<UnitGroup>,
    /// Files present in the diff that have no addressable hunks
    /// (binary, mode-only, pure renames) and will not be committed.
    pub skipped_paths: Vec<String>,
}

/// Resolves the model name: CLI flag, then GIT_WEAVE_MODEL, then default.
pub fn resolve_model(flag: Option<String>) -> String {
    flag.or_else(|| settings::get_env_var("GIT_WEAVE_MODEL").ok())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Builds the default grouping client from the environment.
pub fn default_grouping_client(model: String) -> Result<GroupingClient> {
    let api_key = settings::get_env_vars(&["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"])
        .map_err(|_| OracleError::ApiKeyNotFound)?;
    let client = AnthropicClient::new(model, api_key)?;
    Ok(GroupingClient::new(Box::new(client)))
}

/// Runs the read-only half of the pipeline: diff, parse, group.
///
/// Returns `None` when the working tree holds no splittable changes.
pub async fn propose(
    git: &dyn GitBackend,
    grouping: &GroupingClient,
    options: &PipelineOptions,
) -> Result<Option<Proposal>> {
    if options.include_untracked {
        git.register_untracked()?;
    }

    let raw_diff = git.raw_diff(options.context_lines)?;
    let units = parse_units(&raw_diff);
    let skipped_paths = unsplittable_paths(&raw_diff);

    if units.is_empty() {
        return Ok(None);
    }

    let file_count = {
        let mut paths: Vec<&str> = units.iter().map(|u| u.path.as_str()).collect();
        paths.dedup();
        paths.len()
    };
    println!(
        "📋 Found {} diff unit(s) across {} file(s)",
        units.len(),
        file_count
    );
    debug!(units = units.len(), files = file_count, "Parsed diff");

    let instructions = options.instructions.as_deref().unwrap_or("");
    let groups = grouping
        .request_groups(&units, &raw_diff, instructions)
        .await?;

    Ok(Some(Proposal {
        raw_diff,
        units,
        groups,
        skipped_paths,
    }))
}

/// Prints the proposed commit groups and any skipped files.
pub fn print_proposal(proposal: &Proposal) {
    println!();
    println!("Proposed commits:");
    for (i, group) in proposal.groups.iter().enumerate() {
        println!(
            "  {}. {} ({} unit(s))",
            i + 1,
            group.message.lines().next().unwrap_or(""),
            group.units.len()
        );
        for id in &group.units {
            println!("       {id}");
        }
    }

    if !proposal.skipped_paths.is_empty() {
        println!();
        println!("⚠️  Skipped (no addressable hunks; commit these manually):");
        for path in &proposal.skipped_paths {
            println!("       {path}");
        }
    }
    println!();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ai::test_utils::QueuedMockAiClient;
    use crate::git::test_support::{make_file_header, make_hunk, make_single_file_diff};

    /// Backend that serves a canned diff and rejects mutations.
    struct DiffOnlyGit {
        diff: String,
        registered: std::sync::Mutex<bool>,
    }

    impl DiffOnlyGit {
        fn new(diff: &str) -> Self {
            Self {
                diff: diff.to_string(),
                registered: std::sync::Mutex::new(false),
            }
        }
    }

    impl GitBackend for DiffOnlyGit {
        fn raw_diff(&self, _context_lines: u32) -> Result<String> {
            Ok(self.diff.clone())
        }
        fn head_revision(&self) -> Result<String> {
            Ok("checkpoint".to_string())
        }
        fn apply_to_index(&self, _patch: &str) -> Result<()> {
            anyhow::bail!("read-only backend")
        }
        fn commit(&self, _message: &str) -> Result<()> {
            anyhow::bail!("read-only backend")
        }
        fn reset_to(&self, _revision: &str) -> Result<()> {
            anyhow::bail!("read-only backend")
        }
        fn register_untracked(&self) -> Result<()> {
            *self.registered.lock().unwrap() = true;
            Ok(())
        }
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            model: None,
            context_lines: 3,
            instructions: None,
            include_untracked: false,
        }
    }

    #[tokio::test]
    async fn propose_returns_none_for_empty_diff() {
        let git = DiffOnlyGit::new("");
        let grouping = GroupingClient::new(Box::new(QueuedMockAiClient::new(vec![])));

        let proposal = propose(&git, &grouping, &options()).await.unwrap();
        assert!(proposal.is_none());
    }

    #[tokio::test]
    async fn propose_groups_and_reports_skipped_files() {
        let diff = format!(
            "{}{}{}",
            make_file_header("a.rs"),
            make_hunk(1, 2, 1, 3, "+line\n"),
            "diff --git a/image.png b/image.png\n\
             index 0000000..abc1234\n\
             Binary files a/image.png and b/image.png differ\n",
        );
        let git = DiffOnlyGit::new(&diff);
        let grouping = GroupingClient::new(Box::new(QueuedMockAiClient::new(vec![Ok(
            r#"[{"message": "fix: thing", "units": ["a.rs:1"]}]"#.to_string(),
        )])));

        let proposal = propose(&git, &grouping, &options()).await.unwrap().unwrap();
        assert_eq!(proposal.units.len(), 1);
        assert_eq!(proposal.groups.len(), 1);
        assert_eq!(proposal.skipped_paths, ["image.png"]);
    }

    #[tokio::test]
    async fn propose_registers_untracked_when_asked() {
        let diff = make_single_file_diff("a.rs", "+line\n");
        let git = DiffOnlyGit::new(&diff);
        let grouping = GroupingClient::new(Box::new(QueuedMockAiClient::new(vec![Ok(
            r#"[{"message": "fix: thing", "units": ["a.rs:1"]}]"#.to_string(),
        )])));

        let mut opts = options();
        opts.include_untracked = true;
        propose(&git, &grouping, &opts).await.unwrap();
        assert!(*git.registered.lock().unwrap());
    }

    #[test]
    fn model_resolution_prefers_flag() {
        assert_eq!(resolve_model(Some("my-model".to_string())), "my-model");
    }
}
