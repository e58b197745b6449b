//! Transactional application of grouped patches as sequential commits.
//!
//! Each group is staged into the index and committed in order. If any
//! stage or commit step fails after at least one commit was created, the
//! repository is rolled back to the pre-operation checkpoint with a single
//! mixed reset, so the operation either produces every intended commit or
//! none of them.

use thiserror::Error;
use tracing::debug;

use crate::git::worktree::GitBackend;
use crate::git::SHORT_HASH_LEN;

/// One group's reconstructed patch and its commit message.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    /// Standalone patch text for this group, applicable to the index.
    pub patch: String,
    /// Commit message produced by the grouping step.
    pub message: String,
}

/// Failure during the multi-commit apply sequence.
///
/// `Stage` and `Commit` are surfaced after a successful rollback (or when
/// there was nothing to roll back); `Rollback` means the reset itself
/// failed and manual recovery from the embedded checkpoint is required.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Staging a group's patch into the index failed.
    #[error("failed to stage changes for commit {index} ({subject:?}): {cause}")]
    Stage {
        /// 1-based position of the failing group.
        index: usize,
        /// Subject line of the group's commit message.
        subject: String,
        /// Underlying git failure.
        cause: anyhow::Error,
    },

    /// Creating a commit from the staged content failed.
    #[error("failed to create commit {index} ({subject:?}): {cause}")]
    Commit {
        /// 1-based position of the failing group.
        index: usize,
        /// Subject line of the group's commit message.
        subject: String,
        /// Underlying git failure.
        cause: anyhow::Error,
    },

    /// The rollback after a stage/commit failure itself failed.
    ///
    /// The repository is left with `attempted` extra commits on top of
    /// `checkpoint`; none were rolled back. Reported instead of being
    /// swallowed so a human can recover with `git reset --mixed <checkpoint>`.
    #[error(
        "rollback to checkpoint {checkpoint} failed ({rolled_back} of {attempted} commit(s) \
         rolled back) after: {original}; rollback error: {cause}"
    )]
    Rollback {
        /// The pre-operation revision that could not be restored.
        checkpoint: String,
        /// Commits that existed when rollback was attempted.
        attempted: usize,
        /// Commits successfully un-done (zero: the reset is all-or-nothing).
        rolled_back: usize,
        /// The stage/commit failure that triggered the rollback.
        original: Box<ApplyError>,
        /// The reset failure.
        cause: anyhow::Error,
    },
}

/// Applies each plan's patch to the index and commits it, in order.
///
/// Returns the number of commits created. On failure, rolls the repository
/// back to `checkpoint` if any commit had already been created; a failure
/// before the first commit needs no rollback.
pub fn apply_groups(
    git: &dyn GitBackend,
    checkpoint: &str,
    plans: &[CommitPlan],
) -> Result<usize, ApplyError> {
    let mut committed = 0usize;

    for (i, plan) in plans.iter().enumerate() {
        let index = i + 1;

        if let Err(cause) = git.apply_to_index(&plan.patch) {
            let failure = ApplyError::Stage {
                index,
                subject: subject_of(&plan.message),
                cause,
            };
            return Err(roll_back(git, checkpoint, committed, failure));
        }

        if let Err(cause) = git.commit(&plan.message) {
            let failure = ApplyError::Commit {
                index,
                subject: subject_of(&plan.message),
                cause,
            };
            return Err(roll_back(git, checkpoint, committed, failure));
        }

        committed += 1;
        debug!(
            "Created commit {}/{}: {}",
            committed,
            plans.len(),
            subject_of(&plan.message)
        );
    }

    Ok(committed)
}

/// Resets to the checkpoint when there is anything to undo, then returns
/// the error the caller should surface.
fn roll_back(
    git: &dyn GitBackend,
    checkpoint: &str,
    committed: usize,
    failure: ApplyError,
) -> ApplyError {
    if committed == 0 {
        return failure;
    }

    debug!(
        "Rolling back {} commit(s) to {}",
        committed,
        &checkpoint[..checkpoint.len().min(SHORT_HASH_LEN)]
    );

    match git.reset_to(checkpoint) {
        Ok(()) => failure,
        Err(cause) => ApplyError::Rollback {
            checkpoint: checkpoint.to_string(),
            attempted: committed,
            rolled_back: 0,
            original: Box::new(failure),
            cause,
        },
    }
}

/// First line of a commit message.
fn subject_of(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}
