//! # git-weave
//!
//! AI-assisted decomposition of working-tree changes into logical git
//! commits.
//!
//! The pipeline: parse the repository's unified diff into per-hunk units,
//! ask an AI model to partition the units into named commit groups,
//! reconstruct a standalone patch per group, then stage and commit each
//! group in sequence with rollback to a pre-operation checkpoint if any
//! step fails.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod git;
pub mod utils;

pub use crate::cli::Cli;
