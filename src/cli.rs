use crate::{
    banner::print_banner,
    date::TargetDate,
    error::{Error, Result},
    git::{GitRunner, SystemGit},
    history, prompt,
    rebase::{self, DEFAULT_REFLOG_OVERHEAD, Report, RewriteOptions, SequenceEditor},
    sequence_editor,
};

use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the log filter, e.g. `GIT_REDATE_LOG=debug`.
pub const LOG_ENV: &str = "GIT_REDATE_LOG";

#[derive(Parser, Debug)]
#[command(name = "git-redate", version, about = "Rewrite the date of any commit on the current branch")]
pub struct Cli {
    #[command(subcommand)]
    pub role: Role,
}

/// The two roles of the executable. `open` drives the rewrite; git calls
/// back into `edit` as its sequence editor while the rebase is planned.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Role {
    /// Pick a commit in the repository and rewrite its date
    Open {
        /// Path to the repository root
        repo: PathBuf,

        /// Leave the reflog entries created by the rebase in place
        #[arg(long)]
        keep_reflog: bool,

        /// Do not run `git rebase --abort` when amending or continuing fails
        #[arg(long)]
        no_abort: bool,

        /// Reflog entries deleted on top of the commit's distance from HEAD
        #[arg(long, default_value_t = DEFAULT_REFLOG_OVERHEAD)]
        reflog_overhead: usize,
    },

    /// Sequence-editor callback used by git during the rebase
    #[command(hide = true)]
    Edit {
        /// Full hash of the commit to mark for editing
        commit: String,

        /// Rebase todo file appended by git
        plan: PathBuf,
    },
}

/// Verifies git is on `PATH`.
fn verify_environment() -> Result<()> {
    match which::which("git") {
        Ok(path) => {
            info!(git = %path.display(), "found git");
            Ok(())
        }
        Err(_) => Err(Error::RebaseStart(String::from("`git` not found in PATH"))),
    }
}

/// Attempts `git rebase --abort` after a failure that can leave the
/// repository mid-rebase. Errors here are only reported.
fn abort_if_stuck<G: GitRunner>(git: &G, err: &Error) {
    if !err.may_leave_rebase() || !git.rebase_in_progress() {
        return;
    }

    warn!(error = %err, "aborting unfinished rebase");
    match git.abort_rebase() {
        Ok(()) => eprintln!(
            "{}",
            style("Rebase aborted; history is unchanged.").yellow().bold()
        ),
        Err(e) => eprintln!(
            "{}",
            style(format!(
                "Could not abort the rebase ({}); resolve it with `git rebase --abort`.",
                e
            ))
            .red()
            .bold()
        ),
    }
}

fn print_report(report: &Report) {
    println!(
        "{}",
        style(format!(
            "✅ Redated {} to {}.",
            crate::sequence_editor::short_id(&report.commit),
            report.date
        ))
        .green()
        .bold()
    );

    if let Some(cleanup) = &report.cleanup {
        if cleanup.mismatched() {
            eprintln!(
                "{}",
                style(format!(
                    "Removed {} reflog entries, but the rewrite created {}.",
                    cleanup.deleted,
                    cleanup.created.unwrap_or_default()
                ))
                .yellow()
            );
        }
    }
}

/// Interactive loop for the `open` role: list commits, ask for a date,
/// confirm, redate, and start over with the rewritten history.
fn open(path: &Path, options: &RewriteOptions, abort_on_failure: bool) -> Result<()> {
    let (repo, paths) = history::open(path)?;
    verify_environment()?;

    let git = SystemGit::new(&paths);
    let editor = SequenceEditor::current_exe()?;

    let mut list_prompter = prompt::DialoguerListPrompter;
    let mut string_prompter = prompt::DialoguerStringPrompter;
    let mut confirm_prompter = prompt::DialoguerConfirmPrompter;

    loop {
        let commits = history::read(&repo)?;

        let index = match prompt::choose_commit(&mut list_prompter, &commits) {
            Ok(Some(i)) => i,
            Ok(None) => return Ok(()),
            Err(e) => return Err(Error::Prompt(e)),
        };
        let commit = &commits[index];

        let date = prompt::ask_date(&mut string_prompter, commit).map_err(Error::Prompt)?;
        if TargetDate::parse(&date)?.before_unix_epoch() {
            warn!(date = %date, "date is before 1970");
            eprintln!(
                "{}",
                style("Dates before 1970 are rejected by git; the rebase will stop at the amend step.")
                    .yellow()
                    .bold()
            );
        }

        print_banner(commit, &date, options.clean_reflog);

        if !prompt::confirm_rewrite(&mut confirm_prompter).map_err(Error::Prompt)? {
            println!(
                "{}",
                style("Canceled by user. No changes made.").yellow().bold()
            );
            continue;
        }

        match rebase::redate(&git, editor.clone(), &commits, index, &date, options) {
            Ok(report) => print_report(&report),
            Err(e) => {
                if abort_on_failure {
                    abort_if_stuck(&git, &e);
                }
                return Err(e);
            }
        }
    }
}

/// Dispatches a parsed command line to its role.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.role {
        Role::Open {
            repo,
            keep_reflog,
            no_abort,
            reflog_overhead,
        } => {
            let options = RewriteOptions {
                reflog_overhead,
                clean_reflog: !keep_reflog,
            };
            open(&repo, &options, !no_abort)?;
            Ok(0)
        }
        Role::Edit { commit, plan } => {
            sequence_editor::rewrite(&plan, &commit)?;
            Ok(0)
        }
    }
}

/// Main CLI entry point for `git-redate`.
///
/// Parses arguments, runs the selected role and prints any error. Every
/// error ends the run; there are no per-kind exit codes.
///
/// # Exit Codes
///
/// * `0` – Successful execution, including quitting the commit list.
/// * Non-zero – Any failure along the way.
pub fn entry() -> std::result::Result<i32, ()> {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("{}", style(format!("Error: {}", e)).red().bold());
            Err(())
        }
    }
}
