//! # git-redate
//!
//! A CLI tool to rewrite the date of a single commit anywhere on the
//! current branch.
//!
//! This crate provides functionality to:
//! - List the branch history and pick a commit
//! - Derive a new timestamp from a typed `YYYY-MM-DD` date
//! - Start an interactive rebase that stops at that commit, with this same
//!   executable acting as git's sequence editor
//! - Amend the author and committer dates, continue the rebase and drop the
//!   reflog entries it left behind
//!
//! ## Usage
//!
//! ```bash
//! # Pick a commit and a new date interactively
//! git-redate open path/to/repo
//!
//! # Called by git itself while planning the rebase
//! git-redate edit <full-commit-hash> <todo-file>
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface and main entry point
//! - [`history`] - Reading the commit history
//! - [`date`] - Timestamp derivation
//! - [`sequence_editor`] - Rebase todo file transformation
//! - [`rebase`] - The rebase phases and the full redate pipeline
//! - [`reflog`] - Reflog cleanup
//! - [`git`] - Git command wrappers
//! - [`prompt`] - User input abstractions
//! - [`banner`] - Decorative CLI banner
//! - [`error`] - Error type

pub mod banner;
pub mod cli;
pub mod date;
pub mod error;
pub mod git;
pub mod history;
pub mod prompt;
pub mod rebase;
pub mod reflog;
pub mod sequence_editor;

pub use error::{Error, Result};
