use std::path::PathBuf;

use tracing::{info, warn};

use crate::date::{self, DerivedTimestamp};
use crate::error::{Error, Result};
use crate::git::{GitRunner, RebaseBase, build_sequence_editor_env};
use crate::history::{Commit, Selection};
use crate::reflog::{self, Cleanup};

/// Reflog entries one redate is assumed to add on top of the selection index.
pub const DEFAULT_REFLOG_OVERHEAD: usize = 4;

/// Where a rewrite currently stands. `Failed` is terminal; nothing moves a
/// failed rewrite back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Planning,
    Paused,
    Amended,
    Completed,
    Failed,
}

/// The command git runs as its sequence editor: this executable in its
/// `edit` role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEditor {
    exe: PathBuf,
}

impl SequenceEditor {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Points at the running executable.
    pub fn current_exe() -> Result<Self> {
        std::env::current_exe()
            .map(Self::new)
            .map_err(|e| Error::RebaseStart(format!("cannot locate current executable: {e}")))
    }

    /// The `GIT_SEQUENCE_EDITOR` value that marks `commit` for editing.
    pub fn command_for(&self, commit: &str) -> String {
        build_sequence_editor_env(&self.exe.to_string_lossy(), commit)
    }
}

/// Drives one commit through the rebase phases.
pub struct Orchestrator<'g, G: GitRunner> {
    git: &'g G,
    editor: SequenceEditor,
    phase: Phase,
}

impl<'g, G: GitRunner> Orchestrator<'g, G> {
    pub fn new(git: &'g G, editor: SequenceEditor) -> Self {
        Self {
            git,
            editor,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rewrites the date of `commit`, found at `selection` in the history.
    ///
    /// On error the phase is left at [`Phase::Failed`] and nothing is undone;
    /// the repository may be mid-rebase.
    pub fn run(
        &mut self,
        selection: Selection,
        commit: &Commit,
        date: &DerivedTimestamp,
    ) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(Error::RebaseStart(format!(
                "rewrite already used (phase {:?})",
                self.phase
            )));
        }

        let result = self.advance(selection, commit, date);
        if result.is_err() {
            self.phase = Phase::Failed;
        }
        result
    }

    fn advance(
        &mut self,
        selection: Selection,
        commit: &Commit,
        date: &DerivedTimestamp,
    ) -> Result<()> {
        if self.git.rebase_in_progress() {
            return Err(Error::RebaseStart(String::from(
                "a rebase is already in progress",
            )));
        }

        let base = if selection.is_root() {
            RebaseBase::Root
        } else {
            RebaseBase::Ancestor(selection.ancestors())
        };

        self.phase = Phase::Planning;
        info!(commit = %commit.short_id(), ?base, "starting interactive rebase");
        self.git.start_rebase(base, &self.editor.command_for(&commit.id))?;

        if !self.git.rebase_in_progress() {
            return Err(Error::Amend(format!(
                "rebase did not stop at {}; no todo line matched it",
                commit.short_id()
            )));
        }
        self.phase = Phase::Paused;

        let git_date = date.to_git_date();
        info!(commit = %commit.short_id(), date = %git_date, "amending paused commit");
        self.git.amend_date(&git_date)?;
        self.phase = Phase::Amended;

        self.git.continue_rebase()?;
        if self.git.rebase_in_progress() {
            return Err(Error::Resume(String::from(
                "rebase stopped again; more than one commit was marked for editing",
            )));
        }
        self.phase = Phase::Completed;
        info!(commit = %commit.short_id(), "rebase completed");

        Ok(())
    }
}

/// Knobs for a single redate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Added to the selection index to get the number of reflog entries to drop.
    pub reflog_overhead: usize,
    /// Skip reflog cleanup entirely when `false`.
    pub clean_reflog: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            reflog_overhead: DEFAULT_REFLOG_OVERHEAD,
            clean_reflog: true,
        }
    }
}

/// What a completed redate did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub commit: String,
    pub date: DerivedTimestamp,
    pub cleanup: Option<Cleanup>,
}

/// Full pipeline for one commit: derive the date, start an interactive
/// rebase with this program as the sequence editor, amend the commit it
/// stops at, continue, then clean the reflog.
///
/// The date is parsed before git is touched, so a malformed date never
/// reaches the repository.
///
/// # Parameters
///
/// * `git` – Runner for the git commands.
/// * `editor` – Command git calls back into to mark the commit.
/// * `commits` – History as returned by [`crate::history::read`].
/// * `index` – Position of the commit to redate, `0` being the tip.
/// * `date_input` – The operator's `YYYY-MM-DD` date.
/// * `options` – Reflog cleanup settings.
///
/// # Returns
///
/// * `Ok(Report)` once the rebase completed and cleanup (if any) ran.
/// * `Err(Error)` from the first step that failed; nothing is rolled back.
pub fn redate<G: GitRunner>(
    git: &G,
    editor: SequenceEditor,
    commits: &[Commit],
    index: usize,
    date_input: &str,
    options: &RewriteOptions,
) -> Result<Report> {
    let selection = Selection::new(index, commits.len())?;
    let commit = &commits[selection.index()];
    let date = date::derive(date_input, commit.zone())?;

    let before = if options.clean_reflog {
        git.reflog_len()
            .inspect_err(|e| warn!(error = %e, "could not count reflog entries before rewrite"))
            .ok()
    } else {
        None
    };

    Orchestrator::new(git, editor).run(selection, commit, &date)?;

    let cleanup = if options.clean_reflog {
        let created = before.and_then(|b| git.reflog_len().ok().map(|after| after.saturating_sub(b)));
        let count = reflog::heuristic_count(selection, options.reflog_overhead);
        Some(reflog::clean(git, count, created)?)
    } else {
        None
    };

    Ok(Report {
        commit: commit.id.clone(),
        date,
        cleanup,
    })
}
