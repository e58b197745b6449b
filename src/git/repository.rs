//! Git repository introspection via libgit2.
//!
//! Used for CLI preflight (are we in a repository, is there anything to
//! split) and for the change listing shown before grouping. All history
//! mutation goes through [`crate::git::worktree`] instead.

use anyhow::{Context, Result};
use git2::{Repository, Status};

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

/// File status information.
#[derive(Debug)]
pub struct FileStatus {
    /// Git status flags (e.g., "AM", "??", "M ").
    pub status: String,
    /// Path to the file relative to repository root.
    pub file: String,
}

impl GitRepository {
    /// Opens the repository at the current directory.
    pub fn open() -> Result<Self> {
        let repo = Repository::open(".").context("Not in a git repository")?;
        Ok(Self { repo })
    }

    /// Opens the repository at the specified path.
    pub fn open_at<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    /// Returns the working directory root.
    pub fn workdir(&self) -> Result<&std::path::Path> {
        self.repo
            .workdir()
            .context("Repository has no working directory (bare repository)")
    }

    /// Returns true when HEAD points at a commit, which the checkpoint
    /// and diff operations require.
    pub fn has_head(&self) -> bool {
        self.repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .is_some()
    }

    /// Lists uncommitted changes, excluding ignored files.
    pub fn pending_changes(&self) -> Result<Vec<FileStatus>> {
        let statuses = self
            .repo
            .statuses(None)
            .context("Failed to get repository status")?;

        let mut changes = Vec::new();
        for entry in statuses.iter() {
            let flags = entry.status();
            if flags.is_ignored() {
                continue;
            }
            if let Some(path) = entry.path() {
                changes.push(FileStatus {
                    status: format_status_flags(flags),
                    file: path.to_string(),
                });
            }
        }

        Ok(changes)
    }
}

/// Formats git status flags into string representation.
fn format_status_flags(flags: Status) -> String {
    let mut status = String::new();

    if flags.contains(Status::INDEX_NEW) {
        status.push('A');
    } else if flags.contains(Status::INDEX_MODIFIED) {
        status.push('M');
    } else if flags.contains(Status::INDEX_DELETED) {
        status.push('D');
    } else if flags.contains(Status::INDEX_RENAMED) {
        status.push('R');
    } else if flags.contains(Status::INDEX_TYPECHANGE) {
        status.push('T');
    } else {
        status.push(' ');
    }

    if flags.contains(Status::WT_NEW) {
        status.push('?');
    } else if flags.contains(Status::WT_MODIFIED) {
        status.push('M');
    } else if flags.contains(Status::WT_DELETED) {
        status.push('D');
    } else if flags.contains(Status::WT_TYPECHANGE) {
        status.push('T');
    } else if flags.contains(Status::WT_RENAMED) {
        status.push('R');
    } else {
        status.push(' ');
    }

    status
}
