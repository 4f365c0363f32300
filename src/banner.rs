use console::{measure_text_width, style};
use std::iter;

use crate::history::Commit;

/// Prints a framed, colorized summary of the rewrite about to happen.
///
/// The frame is sized to the widest **visible** line, using
/// [`console::measure_text_width`] so embedded ANSI codes do not throw off
/// the padding. Borders are styled separately from the content.
///
/// # Parameters
///
/// * `commit` – The commit whose date will be rewritten.
/// * `date` – The validated `YYYY-MM-DD` date typed by the user.
/// * `clean_reflog` – Whether reflog cleanup will run afterwards.
///
/// # Examples
///
/// ```no_run
/// use chrono::{DateTime, FixedOffset};
/// use git_redate::{banner::print_banner, history::Commit};
///
/// let commit = Commit {
///     id: "0123456789abcdef0123456789abcdef01234567".into(),
///     summary: "Initial commit".into(),
///     committed: DateTime::from_timestamp(0, 0)
///         .unwrap()
///         .with_timezone(&FixedOffset::east_opt(0).unwrap()),
/// };
/// print_banner(&commit, "2025-08-31", true);
/// ```
pub fn print_banner(commit: &Commit, date: &str, clean_reflog: bool) {
    let lines = banner_lines(commit, date, clean_reflog);

    let max_width = lines
        .iter()
        .map(|l| measure_text_width(l))
        .max()
        .unwrap_or(0)
        + 2;

    let border = "═".repeat(max_width);
    let top = style(format!("╔{}╗", border)).blue().bold();
    let bottom = style(format!("╚{}╝", border)).blue().bold();
    let left = style("║ ").blue().bold().to_string();
    let right = style("║").blue().bold().to_string();

    println!();
    println!("{top}");
    for line in lines {
        let visible = measure_text_width(&line);
        let pad = max_width - visible;
        println!("{}{}{}{}", left, line, " ".repeat(pad - 1), right);
    }
    println!("{bottom}");
    println!();
}

/// Builds the banner lines: title, commit, old and new date, then the steps.
///
/// Some lines carry ANSI styling; measure them with
/// `console::measure_text_width`, not `str::len()`.
fn banner_lines(commit: &Commit, date: &str, clean_reflog: bool) -> Vec<String> {
    let top = ["Redate a commit via interactive rebase", ""]
        .into_iter()
        .map(|s| s.to_string());

    let summary = [
        format!(
            "Commit:   {} {}",
            style(commit.short_id()).yellow().bold(),
            commit.summary
        ),
        format!(
            "Current:  {}",
            commit.committed.format("%Y-%m-%d %H:%M:%S %:z")
        ),
        format!(
            "New:      {} {}",
            style(date).cyan().bold(),
            style(format!(
                "(random time of day, {})",
                commit.committed.format("%:z")
            ))
            .cyan()
        ),
    ]
    .into_iter();

    let cleanup = if clean_reflog {
        "  3) Delete the reflog entries the rebase created"
    } else {
        "  3) Leave the reflog untouched (--keep-reflog)"
    };

    let bottom = iter::once(String::new()).chain(
        [
            "This tool will automatically:",
            "  1) Stop the rebase at this commit and amend its dates",
            "  2) Run `git rebase --continue` to replay the rest",
            cleanup,
        ]
        .into_iter()
        .map(|s| s.to_string()),
    );

    top.chain(summary).chain(bottom).collect()
}

#[cfg(test)]
mod tests {
    use super::banner_lines;
    use crate::history::Commit;
    use chrono::{DateTime, FixedOffset};

    fn commit() -> Commit {
        Commit {
            id: "abcdef0123456789".to_string(),
            summary: "Add parser".to_string(),
            committed: DateTime::from_timestamp(1_600_000_000, 0)
                .expect("timestamp")
                .with_timezone(&FixedOffset::east_opt(3600).expect("offset")),
        }
    }

    #[test]
    fn banner_lists_commit_and_dates() {
        let lines = banner_lines(&commit(), "2025-08-31", true);
        let s = console::strip_ansi_codes(&lines.join("\n")).to_string();

        assert!(s.contains("Redate a commit via interactive rebase"));
        assert!(s.contains("Commit:   abcdef0 Add parser"));
        assert!(s.contains("Current:  2020-09-13 13:26:40 +01:00"));
        assert!(s.contains("New:      2025-08-31 (random time of day, +01:00)"));
        assert!(s.contains("Delete the reflog entries"));
    }

    #[test]
    fn banner_mentions_kept_reflog() {
        let lines = banner_lines(&commit(), "2025-08-31", false);
        let s = lines.join("\n");

        assert!(s.contains("Leave the reflog untouched"));
        assert!(!s.contains("Delete the reflog entries"));
    }
}
