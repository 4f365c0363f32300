use std::path::PathBuf;

/// Every way a redate run can fail.
///
/// None of these are retried. They bubble up to [`crate::cli::entry`], which
/// prints the message and, for failures after the rebase started, may try a
/// best-effort `git rebase --abort`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a usable git repository at {path}: {source}")]
    Repository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("failed to read commit history: {0}")]
    HistoryRead(#[source] git2::Error),

    #[error("commit index {index} is out of range ({len} commits in history)")]
    Selection { index: usize, len: usize },

    #[error("invalid date {input:?}: expected YYYY-MM-DD")]
    DateFormat { input: String },

    #[error("rebase plan {path}: {source}")]
    PlanIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start interactive rebase: {0}")]
    RebaseStart(String),

    #[error("could not amend the paused commit: {0}")]
    Amend(String),

    #[error("could not continue the rebase: {0}")]
    Resume(String),

    #[error("failed to delete reflog entry {entry} of {total}: {reason}")]
    ReflogCleanup {
        entry: usize,
        total: usize,
        reason: String,
    },

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl Error {
    /// True for failures that can leave the repository mid-rebase.
    pub fn may_leave_rebase(&self) -> bool {
        matches!(self, Error::Amend(_) | Error::Resume(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
