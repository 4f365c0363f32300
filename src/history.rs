use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use git2::{Repository, RepositoryOpenFlags};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sequence_editor::short_id;

/// One commit of the walked history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub summary: String,
    /// Committer time, in the committer's original offset.
    pub committed: DateTime<FixedOffset>,
}

impl Commit {
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn zone(&self) -> FixedOffset {
        *self.committed.offset()
    }
}

/// Location of an opened repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Working tree root, used as the cwd for every git invocation.
    pub root: PathBuf,
    /// The `.git` directory.
    pub git_dir: PathBuf,
}

/// A chosen position in the history, `0` being the branch tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    len: usize,
}

impl Selection {
    /// Validates `index` against a history of `len` commits.
    pub fn new(index: usize, len: usize) -> Result<Self> {
        if index >= len {
            return Err(Error::Selection { index, len });
        }
        Ok(Self { index, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// How many commits the rebase has to replay, the selected one included.
    pub fn ancestors(&self) -> usize {
        self.index + 1
    }

    /// True when the selected commit has no parent in the walked history,
    /// so `HEAD~ancestors` does not exist.
    pub fn is_root(&self) -> bool {
        self.index + 1 == self.len
    }
}

/// Opens the repository at `path`. Parent directories are not searched, so
/// `path` must be the working tree root (or the `.git` directory itself).
pub fn open(path: &Path) -> Result<(Repository, RepoPaths)> {
    let no_dirs: &[&OsStr] = &[];
    let repo = Repository::open_ext(path, RepositoryOpenFlags::NO_SEARCH, no_dirs).map_err(
        |source| Error::Repository {
            path: path.to_path_buf(),
            source,
        },
    )?;

    let root = match repo.workdir() {
        Some(dir) => dir.to_path_buf(),
        None => {
            return Err(Error::Repository {
                path: path.to_path_buf(),
                source: git2::Error::from_str("bare repositories have no working tree"),
            });
        }
    };
    let git_dir = repo.path().to_path_buf();

    Ok((repo, RepoPaths { root, git_dir }))
}

/// Walks first-parent history from `HEAD`, newest first.
///
/// # Returns
///
/// * `Ok(Vec<Commit>)` with index `0` being the branch tip.
/// * `Err(Error::Repository)` if `HEAD` cannot be resolved to a commit.
/// * `Err(Error::HistoryRead)` if any commit in the walk cannot be decoded.
pub fn read(repo: &Repository) -> Result<Vec<Commit>> {
    let head = repo.head().map_err(|source| Error::Repository {
        path: repo.path().to_path_buf(),
        source,
    })?;
    let tip = head.peel_to_commit().map_err(|source| Error::Repository {
        path: repo.path().to_path_buf(),
        source,
    })?;

    let mut revwalk = repo.revwalk().map_err(Error::HistoryRead)?;
    revwalk.push(tip.id()).map_err(Error::HistoryRead)?;
    revwalk.simplify_first_parent().map_err(Error::HistoryRead)?;

    let mut commits = Vec::new();
    for oid in revwalk {
        let oid = oid.map_err(Error::HistoryRead)?;
        let commit = repo.find_commit(oid).map_err(Error::HistoryRead)?;
        commits.push(convert(&commit)?);
    }

    debug!(count = commits.len(), tip = %tip.id(), "read commit history");
    Ok(commits)
}

/// Number of entries in the `HEAD` reflog.
pub fn reflog_len(repo: &Repository) -> Result<usize> {
    repo.reflog("HEAD")
        .map(|log| log.len())
        .map_err(Error::HistoryRead)
}

fn convert(commit: &git2::Commit<'_>) -> Result<Commit> {
    let when = commit.committer().when();
    let undecodable = |what: &str| {
        Error::HistoryRead(git2::Error::from_str(&format!(
            "commit {} has an invalid {what}",
            commit.id()
        )))
    };

    let zone = FixedOffset::east_opt(when.offset_minutes() * 60)
        .ok_or_else(|| undecodable("time zone offset"))?;
    let committed = DateTime::from_timestamp(when.seconds(), 0)
        .ok_or_else(|| undecodable("timestamp"))?
        .with_timezone(&zone);

    let message = String::from_utf8_lossy(commit.message_bytes());
    let summary = message.lines().next().unwrap_or_default().to_string();

    Ok(Commit {
        id: commit.id().to_string(),
        summary,
        committed,
    })
}
