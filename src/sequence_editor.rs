use std::{
    fs::{File, read_to_string},
    io::Write,
    path::Path,
};

use tracing::debug;

use crate::error::{Error, Result};

/// Length of the abbreviated hashes git writes into the rebase todo list.
pub const SHORT_ID_LEN: usize = 7;

const KEEP_ACTION: &str = "pick";
const EDIT_ACTION: &str = "edit";

/// Entry point for the `edit` role: marks `commit` for editing in the todo
/// file at `todo_path`.
///
/// # Arguments
///
/// * `commit` - Full hash of the commit to stop at.
/// * `todo_path` - Path of the todo file git handed to the sequence editor.
///
/// # Returns
///
/// * `Ok(())` on success, including when no line matched.
/// * `Err(Error::PlanIo)` if reading or writing the file fails.
pub fn rewrite(todo_path: &Path, commit: &str) -> Result<()> {
    let body = read_to_string(todo_path).map_err(|source| Error::PlanIo {
        path: todo_path.to_path_buf(),
        source,
    })?;

    let transformed = mark_for_edit(&body, commit);
    debug!(
        path = %todo_path.display(),
        changed = transformed != body,
        "rewrote rebase todo"
    );

    let mut file = File::create(todo_path).map_err(|source| Error::PlanIo {
        path: todo_path.to_path_buf(),
        source,
    })?;

    file.write_all(transformed.as_bytes())
        .map_err(|source| Error::PlanIo {
            path: todo_path.to_path_buf(),
            source,
        })
}

/// Returns the first [`SHORT_ID_LEN`] characters of `commit`.
pub fn short_id(commit: &str) -> &str {
    match commit.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &commit[..end],
        None => commit,
    }
}

/// Flips every `pick <short-id>` in `plan` to `edit <short-id>`.
///
/// The hash is truncated to its short form first. All occurrences are
/// replaced, so two commits sharing a short prefix are both marked. Nothing
/// matching is not an error here; the amend step notices when no rebase
/// paused.
///
/// Applying it twice is the same as applying it once: after the first pass
/// the `pick` form is gone.
pub fn mark_for_edit(plan: &str, commit: &str) -> String {
    let short = short_id(commit);
    plan.replace(
        &format!("{KEEP_ACTION} {short}"),
        &format!("{EDIT_ACTION} {short}"),
    )
}

#[cfg(test)]
mod tests {
    use super::{mark_for_edit, rewrite, short_id};
    use crate::error::Error;
    use std::io::{Read, Write};

    const PLAN: &str = "pick 1a2b3c4 First change\n\
                        pick 5d6e7f8 Second change\n\
                        pick 9a8b7c6 Third change\n\
                        \n\
                        # Rebase 0f0f0f0..9a8b7c6 onto 0f0f0f0 (3 commands)\n";

    #[test]
    fn short_id_truncates_to_seven() {
        assert_eq!(short_id("5d6e7f8a9b0c1d2e3f40"), "5d6e7f8");
    }

    #[test]
    fn short_id_keeps_short_input() {
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn marks_only_the_target_line() {
        let out = mark_for_edit(PLAN, "5d6e7f8a9b0c1d2e3f405d6e7f8a9b0c1d2e3f40");

        let before: Vec<&str> = PLAN.lines().collect();
        let after: Vec<&str> = out.lines().collect();
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            if b.starts_with("pick 5d6e7f8") {
                assert_eq!(*a, "edit 5d6e7f8 Second change");
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn second_application_is_noop() {
        let once = mark_for_edit(PLAN, "9a8b7c6ffff");
        let twice = mark_for_edit(&once, "9a8b7c6ffff");
        assert_eq!(once, twice);
        assert!(twice.contains("edit 9a8b7c6 Third change"));
    }

    #[test]
    fn missing_commit_leaves_plan_untouched() {
        let out = mark_for_edit(PLAN, "deadbeefcafe");
        assert_eq!(out, PLAN);
    }

    #[test]
    fn short_prefix_collision_marks_both() {
        let plan = "pick abcdef1 One\npick abcdef1 Two\npick 1234567 Three\n";
        let out = mark_for_edit(plan, "abcdef1000000");
        assert_eq!(out, "edit abcdef1 One\nedit abcdef1 Two\npick 1234567 Three\n");
    }

    #[test]
    fn comment_mentioning_the_hash_only_changes_pick_form() {
        let plan = "pick 1a2b3c4 msg\n# 1a2b3c4 is the one\n";
        let out = mark_for_edit(plan, "1a2b3c4d");
        assert_eq!(out, "edit 1a2b3c4 msg\n# 1a2b3c4 is the one\n");
    }

    #[test]
    fn rewrite_updates_file_in_place() {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
        write!(file, "{}", PLAN).expect("failed to write plan");
        let path = file.path().to_path_buf();

        rewrite(&path, "1a2b3c4d5e6f").expect("rewrite failed");

        let mut s = String::new();
        let mut f = std::fs::File::open(&path).expect("failed to open file");
        f.read_to_string(&mut s).expect("failed to read file");

        assert!(s.starts_with("edit 1a2b3c4 First change\n"));
        assert!(s.contains("pick 5d6e7f8 Second change"));
        assert!(s.ends_with("(3 commands)\n"));
    }

    #[test]
    fn rewrite_missing_file_is_plan_io_error() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("git-rebase-todo");

        let result = rewrite(&path, "1a2b3c4d5e6f");
        assert!(matches!(result, Err(Error::PlanIo { .. })));
    }
}
