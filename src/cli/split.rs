//! The `split` command: decompose uncommitted changes into AI-grouped
//! commits.

use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;

use crate::ai::UnitGroup;
use crate::cli::pipeline::{self, PipelineOptions, Proposal};
use crate::git::diff::DiffUnit;
use crate::git::worktree::{CliGit, GitBackend};
use crate::git::{apply_groups, build_patch, ApplyError, CommitPlan, GitRepository, SHORT_HASH_LEN};

/// Splits uncommitted changes into AI-grouped commits.
#[derive(Parser)]
pub struct SplitCommand {
    /// Shared pipeline options.
    #[command(flatten)]
    pub options: PipelineOptions,

    /// Skips the confirmation prompt and commits immediately.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl SplitCommand {
    /// Executes the split command.
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::open()?;
        if !repo.has_head() {
            anyhow::bail!("Repository has no commits yet; create an initial commit first");
        }
        let pending = repo.pending_changes()?;
        if pending.is_empty() {
            println!("Working tree is clean; nothing to split.");
            return Ok(());
        }
        println!("📝 Uncommitted changes:");
        for change in &pending {
            println!("  {} {}", change.status, change.file);
        }

        let workdir = repo.workdir()?.to_path_buf();
        let git = CliGit::new(&workdir);

        let model = pipeline::resolve_model(self.options.model.clone());
        println!("📡 Model: {model}");
        let grouping = pipeline::default_grouping_client(model)?;

        let Some(proposal) = pipeline::propose(&git, &grouping, &self.options).await? else {
            println!("No splittable changes found.");
            return Ok(());
        };

        pipeline::print_proposal(&proposal);

        if !self.yes
            && !confirm_proposal(
                proposal.groups.len(),
                io::stdin().is_terminal(),
                &mut io::BufReader::new(io::stdin()),
            )?
        {
            println!("❌ Split cancelled by user");
            return Ok(());
        }

        let checkpoint = git.head_revision()?;
        let plans = build_plans(&proposal)?;

        match apply_groups(&git, &checkpoint, &plans) {
            Ok(count) => {
                println!("✅ Created {count} commit(s)");
                Ok(())
            }
            Err(err @ ApplyError::Rollback { .. }) => {
                eprintln!(
                    "❌ Rollback failed; recover manually with: git reset --mixed {}",
                    &checkpoint[..checkpoint.len().min(SHORT_HASH_LEN)]
                );
                Err(err.into())
            }
            Err(err) => {
                println!(
                    "↩️  Rolled repository back to {}",
                    &checkpoint[..checkpoint.len().min(SHORT_HASH_LEN)]
                );
                Err(err.into())
            }
        }
    }
}

/// Turns each group into a commit plan with its reconstructed patch.
fn build_plans(proposal: &Proposal) -> Result<Vec<CommitPlan>> {
    let by_id: HashMap<String, &DiffUnit> =
        proposal.units.iter().map(|u| (u.id(), u)).collect();

    proposal
        .groups
        .iter()
        .map(|group| {
            let units = units_for_group(group, &by_id)?;
            Ok(CommitPlan {
                patch: build_patch(&units),
                message: group.message.clone(),
            })
        })
        .collect()
}

/// Resolves a group's unit ids back to parsed units.
///
/// The grouping repair guarantees every id is known, so a miss here means
/// an internal inconsistency rather than bad AI output.
fn units_for_group<'a>(
    group: &UnitGroup,
    by_id: &HashMap<String, &'a DiffUnit>,
) -> Result<Vec<&'a DiffUnit>> {
    group
        .units
        .iter()
        .map(|id| {
            by_id
                .get(id)
                .copied()
                .with_context(|| format!("Unknown diff unit id after repair: {id}"))
        })
        .collect()
}

/// Asks the user to confirm the proposed commits.
///
/// `is_terminal` and `reader` are injected so tests can drive the function
/// without blocking on real stdin.
fn confirm_proposal(
    group_count: usize,
    is_terminal: bool,
    reader: &mut impl BufRead,
) -> Result<bool> {
    if !is_terminal {
        eprintln!("warning: stdin is not interactive, cannot confirm split");
        return Ok(false);
    }

    loop {
        print!("❓ Create {group_count} commit(s) as shown? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes = reader.read_line(&mut input)?;
        if bytes == 0 {
            eprintln!("warning: stdin closed, cancelling split");
            return Ok(false);
        }

        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer 'y' or 'n'."),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::git::diff::parse_units;
    use crate::git::test_support::{make_file_header, make_hunk, make_single_file_diff};

    fn proposal_with(groups: Vec<UnitGroup>, diff: &str) -> Proposal {
        Proposal {
            raw_diff: diff.to_string(),
            units: parse_units(diff),
            groups,
            skipped_paths: Vec::new(),
        }
    }

    #[test]
    fn build_plans_one_patch_per_group() {
        let diff = format!(
            "{}{}{}{}",
            make_file_header("a.ts"),
            make_hunk(1, 2, 1, 3, "+one\n"),
            make_hunk(10, 2, 11, 3, "+two\n"),
            make_single_file_diff("b.ts", "+three\n"),
        );
        let groups = vec![
            UnitGroup {
                message: "fix x".to_string(),
                units: vec!["a.ts:1".to_string()],
            },
            UnitGroup {
                message: "feat y".to_string(),
                units: vec!["a.ts:2".to_string(), "b.ts:1".to_string()],
            },
        ];
        let plans = build_plans(&proposal_with(groups, &diff)).unwrap();

        assert_eq!(plans.len(), 2);
        assert!(plans[0].patch.contains("+one"));
        assert!(!plans[0].patch.contains("+two"));
        assert!(plans[1].patch.contains("+two"));
        assert!(plans[1].patch.contains("+three"));
        assert_eq!(plans[0].message, "fix x");
    }

    #[test]
    fn build_plans_rejects_unknown_id() {
        let diff = make_single_file_diff("a.ts", "+one\n");
        let groups = vec![UnitGroup {
            message: "fix".to_string(),
            units: vec!["ghost.ts:7".to_string()],
        }];
        assert!(build_plans(&proposal_with(groups, &diff)).is_err());
    }

    #[test]
    fn confirm_accepts_default_and_yes() {
        let mut input = "\n".as_bytes();
        assert!(confirm_proposal(2, true, &mut input).unwrap());

        let mut input = "y\n".as_bytes();
        assert!(confirm_proposal(2, true, &mut input).unwrap());

        let mut input = "YES\n".as_bytes();
        assert!(confirm_proposal(2, true, &mut input).unwrap());
    }

    #[test]
    fn confirm_rejects_no_and_closed_stdin() {
        let mut input = "n\n".as_bytes();
        assert!(!confirm_proposal(2, true, &mut input).unwrap());

        let mut input = "".as_bytes();
        assert!(!confirm_proposal(2, true, &mut input).unwrap());
    }

    #[test]
    fn confirm_reprompts_on_garbage() {
        let mut input = "what\nn\n".as_bytes();
        assert!(!confirm_proposal(2, true, &mut input).unwrap());
    }

    #[test]
    fn confirm_declines_without_terminal() {
        let mut input = "y\n".as_bytes();
        assert!(!confirm_proposal(2, false, &mut input).unwrap());
    }
}
