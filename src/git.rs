use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};
use crate::history::{self, RepoPaths};

/// Environment variable git reads the sequence editor command from.
pub const SEQUENCE_EDITOR_ENV: &str = "GIT_SEQUENCE_EDITOR";

/// Environment variable git reads the committer date from.
pub const COMMITTER_DATE_ENV: &str = "GIT_COMMITTER_DATE";

/// Where an interactive rebase starts replaying from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseBase {
    /// `HEAD~n`.
    Ancestor(usize),
    /// The whole history, for when the selected commit is the root.
    Root,
}

impl RebaseBase {
    fn arg(&self) -> String {
        match self {
            RebaseBase::Ancestor(n) => format!("HEAD~{n}"),
            RebaseBase::Root => String::from("--root"),
        }
    }
}

/// The git operations the rewrite protocol needs.
///
/// [`SystemGit`] runs the real `git` binary. Tests substitute a recorder so
/// the phase ordering can be checked without a repository.
pub trait GitRunner {
    /// Runs `git rebase -i <base>` with `sequence_editor` as the
    /// `GIT_SEQUENCE_EDITOR` command. Blocks until git stops or fails.
    fn start_rebase(&self, base: RebaseBase, sequence_editor: &str) -> Result<()>;

    /// True while an interactive or apply-style rebase is stopped.
    fn rebase_in_progress(&self) -> bool;

    /// Amends `HEAD` in place, setting both author and committer date to `date`.
    fn amend_date(&self, date: &str) -> Result<()>;

    /// Runs `git rebase --continue`.
    fn continue_rebase(&self) -> Result<()>;

    /// Runs `git rebase --abort`.
    fn abort_rebase(&self) -> std::result::Result<(), String>;

    /// Deletes the newest `HEAD` reflog entry.
    fn delete_newest_reflog_entry(&self) -> std::result::Result<(), String>;

    /// Number of entries in the `HEAD` reflog.
    fn reflog_len(&self) -> Result<usize>;
}

/// [`GitRunner`] backed by the `git` executable, always run from the
/// repository root instead of the process working directory.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: OsString,
    root: PathBuf,
    git_dir: PathBuf,
}

impl SystemGit {
    pub fn new(paths: &RepoPaths) -> Self {
        Self::with_program(paths, "git")
    }

    /// Uses `program` in place of `git` from `PATH`.
    pub fn with_program(paths: &RepoPaths, program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            root: paths.root.clone(),
            git_dir: paths.git_dir.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.root);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl GitRunner for SystemGit {
    fn start_rebase(&self, base: RebaseBase, sequence_editor: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("rebase").arg("-i").arg(base.arg());
        cmd.env(SEQUENCE_EDITOR_ENV, sequence_editor);
        debug!(base = %base.arg(), editor = %sequence_editor, "git rebase -i");

        run_output(cmd)
            .map(|_| ())
            .map_err(|e| Error::RebaseStart(format!("{e} (is git installed?)")))
    }

    fn rebase_in_progress(&self) -> bool {
        rebase_in_progress(&self.git_dir)
    }

    fn amend_date(&self, date: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("commit")
            .arg("--amend")
            .arg("--no-edit")
            .arg("--allow-empty")
            .arg("--date")
            .arg(date);
        // `--date` only sets the author date.
        cmd.env(COMMITTER_DATE_ENV, date);
        debug!(%date, "git commit --amend");

        run_output(cmd).map(|_| ()).map_err(Error::Amend)
    }

    fn continue_rebase(&self) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("rebase").arg("--continue");
        debug!("git rebase --continue");

        run_output(cmd).map(|_| ()).map_err(Error::Resume)
    }

    fn abort_rebase(&self) -> std::result::Result<(), String> {
        let mut cmd = self.command();
        cmd.arg("rebase").arg("--abort");
        debug!("git rebase --abort");

        run_output(cmd).map(|_| ())
    }

    fn delete_newest_reflog_entry(&self) -> std::result::Result<(), String> {
        let mut cmd = self.command();
        cmd.arg("reflog").arg("delete").arg("HEAD@{0}");

        run_output(cmd).map(|_| ())
    }

    fn reflog_len(&self) -> Result<usize> {
        let repo = git2::Repository::open(&self.git_dir).map_err(|source| Error::Repository {
            path: self.git_dir.clone(),
            source,
        })?;
        history::reflog_len(&repo)
    }
}

/// Builds the value for the `GIT_SEQUENCE_EDITOR` environment variable.
///
/// Git appends the todo file path to this command, so the callback ends up
/// invoked as `<exe> edit <commit> <todo-path>`. Backslashes in `exe_path`
/// are turned into forward slashes, since git runs the value through `sh`,
/// and the path is quoted if it contains spaces.
///
/// # Examples
///
/// ```
/// use git_redate::git::build_sequence_editor_env;
///
/// assert_eq!(
///     build_sequence_editor_env("/usr/local/bin/git-redate", "0123abc"),
///     "/usr/local/bin/git-redate edit 0123abc"
/// );
/// assert_eq!(
///     build_sequence_editor_env(r"C:\Program Files\git-redate.exe", "0123abc"),
///     "\"C:/Program Files/git-redate.exe\" edit 0123abc"
/// );
/// ```
pub fn build_sequence_editor_env(exe_path: &str, commit: &str) -> String {
    let normalized = exe_path.replace('\\', "/");
    let quoted = if normalized.contains(' ') {
        format!("\"{}\"", normalized)
    } else {
        normalized
    };

    format!("{quoted} edit {commit}")
}

/// Runs a command and returns its trimmed standard output on success,
/// or its standard error as an `Err` on failure.
///
/// If the process fails to spawn, the I/O error message is returned.
fn run_output(mut cmd: Command) -> std::result::Result<String, String> {
    let out_res = cmd.output();
    match out_res {
        Ok(out) => {
            if out.status.success() {
                Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
            } else {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                if stderr.is_empty() {
                    Err(format!("exited with {}", out.status))
                } else {
                    Err(stderr)
                }
            }
        }
        Err(e) => Err(format!("failed to launch {:?}: {}", cmd.get_program(), e)),
    }
}

/// Detects if a Git rebase is currently in progress.
///
/// This checks for the presence of the `rebase-merge` or `rebase-apply`
/// directories inside `.git/`, which git creates while a rebase is stopped.
pub fn rebase_in_progress(git_dir: &Path) -> bool {
    git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists()
}
