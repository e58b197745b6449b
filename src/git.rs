//! Git operations: diff parsing, patch reconstruction, and the
//! transactional apply engine.

pub mod apply;
pub mod diff;
pub mod patch;
pub mod repository;
pub mod worktree;

#[cfg(test)]
pub(crate) mod test_support;

pub use apply::{apply_groups, ApplyError, CommitPlan};
pub use diff::{parse_units, unsplittable_paths, DiffUnit};
pub use patch::build_patch;
pub use repository::GitRepository;
pub use worktree::{CliGit, GitBackend};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
