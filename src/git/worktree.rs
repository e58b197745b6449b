//! Process-level git operations behind a trait seam.
//!
//! The apply engine and the CLI talk to git through [`GitBackend`] so
//! tests can substitute a scripted implementation. [`CliGit`] is the real
//! one, spawning the `git` binary in the repository root.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

/// Git operations the core engine depends on.
///
/// All methods block until the underlying process finishes; each git
/// mutation depends on the previous one having left the index in a
/// defined state, so callers must issue them strictly sequentially.
pub trait GitBackend {
    /// Returns the full unified diff of the working tree against HEAD.
    fn raw_diff(&self, context_lines: u32) -> Result<String>;

    /// Returns the current HEAD revision, used as the rollback checkpoint.
    fn head_revision(&self) -> Result<String>;

    /// Applies a patch to the staging index only, never the working tree.
    fn apply_to_index(&self, patch: &str) -> Result<()>;

    /// Creates a commit from the currently staged content.
    fn commit(&self, message: &str) -> Result<()>;

    /// Mixed reset to the given revision: moves the history pointer and
    /// clears the index, leaving working-tree files untouched.
    fn reset_to(&self, revision: &str) -> Result<()>;

    /// Registers untracked files with `--intent-to-add` so they appear in
    /// the diff and can be staged by patch application.
    fn register_untracked(&self) -> Result<()>;
}

/// [`GitBackend`] implementation that shells out to the `git` binary.
pub struct CliGit {
    root: PathBuf,
}

impl CliGit {
    /// Creates a backend rooted at the given working directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Runs a git subcommand and returns its stdout.
    fn run_git(&self, args: &[&str]) -> Result<String> {
        debug!("Running git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitBackend for CliGit {
    fn raw_diff(&self, context_lines: u32) -> Result<String> {
        let context_flag = format!("-U{context_lines}");
        self.run_git(&["diff", "--no-color", &context_flag, "HEAD"])
    }

    fn head_revision(&self) -> Result<String> {
        let out = self.run_git(&["rev-parse", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn apply_to_index(&self, patch: &str) -> Result<()> {
        let mut child = Command::new("git")
            .args(["apply", "--cached", "--whitespace=nowarn", "-"])
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn git apply")?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(patch.as_bytes())
                .context("Failed to write patch to git apply")?;
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for git apply")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git apply --cached failed: {}", stderr.trim());
        }

        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_git(&["commit", "-m", message])?;
        Ok(())
    }

    fn reset_to(&self, revision: &str) -> Result<()> {
        self.run_git(&["reset", "--mixed", revision])?;
        Ok(())
    }

    fn register_untracked(&self) -> Result<()> {
        self.run_git(&["add", "--intent-to-add", "--all"])?;
        Ok(())
    }
}
