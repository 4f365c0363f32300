use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

use crate::date::DATE_FORMAT;
use crate::history::Commit;

/// Abstraction over a list selection prompt, so commit picking can be
/// driven by a mock in tests.
pub trait ListPrompter {
    /// Show `items` and let the user pick one.
    ///
    /// # Parameters
    /// - `prompt`: Heading shown above the list.
    /// - `items`: One display line per entry.
    /// - `default`: Index highlighted initially.
    ///
    /// # Returns
    /// `Ok(Some(index))` for a pick, `Ok(None)` if the user backed out, or
    /// `Err(String)` on input failure.
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, String>;
}

/// Abstraction over a single-line text prompt, used for the new date.
pub trait StringPrompter {
    /// Ask for one line of text.
    ///
    /// # Parameters
    /// - `prompt`: Question shown to the user.
    /// - `default`: Value kept when the user just presses Enter.
    ///
    /// # Returns
    /// `Ok(String)` with the entered text, or `Err(String)` on input failure.
    fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String>;
}

/// Abstraction over the yes/no gate before history is rewritten.
pub trait ConfirmPrompter {
    /// Ask a yes/no question.
    ///
    /// # Parameters
    /// - `prompt`: Question shown to the user.
    /// - `default`: Answer taken when the user just presses Enter.
    ///
    /// # Returns
    /// `Ok(true)` if confirmed, `Ok(false)` if declined, or `Err(String)` on input failure.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String>;
}

/// Theme shared by every dialoguer prompt in the tool.
fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// [`ListPrompter`] backed by `dialoguer::Select`; Esc or `q` yields `None`.
pub struct DialoguerListPrompter;

impl ListPrompter for DialoguerListPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, String> {
        Select::with_theme(&theme())
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()
            .map_err(|e| e.to_string())
    }
}

/// [`StringPrompter`] backed by `dialoguer::Input`, pre-filled with the default.
pub struct DialoguerStringPrompter;

impl StringPrompter for DialoguerStringPrompter {
    fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String> {
        Input::<String>::with_theme(&theme())
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .map_err(|e| e.to_string())
    }
}

/// [`ConfirmPrompter`] backed by `dialoguer::Confirm`.
pub struct DialoguerConfirmPrompter;

impl ConfirmPrompter for DialoguerConfirmPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String> {
        Confirm::with_theme(&theme())
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| e.to_string())
    }
}

/// One line per commit: short hash, committer date and summary.
pub fn commit_items(commits: &[Commit]) -> Vec<String> {
    commits
        .iter()
        .map(|c| {
            format!(
                "{} {} {}",
                c.short_id(),
                c.committed.format("%Y-%m-%d %H:%M %:z"),
                c.summary
            )
        })
        .collect()
}

/// Ask the user which commit to redate.
///
/// # Returns
/// - `Ok(Some(index))` into `commits`, `0` being the tip.
/// - `Ok(None)` if the user quit the list.
/// - `Err(String)` if input failed.
pub fn choose_commit<P: ListPrompter>(
    prompter: &mut P,
    commits: &[Commit],
) -> Result<Option<usize>, String> {
    let items = commit_items(commits);
    prompter.select("Choose a commit (esc to quit)", &items, 0)
}

/// Ask for the new date of `commit`, defaulting to its current date.
pub fn ask_date<P: StringPrompter>(prompter: &mut P, commit: &Commit) -> Result<String, String> {
    let prompt = format!("New date for {} (YYYY-MM-DD)", commit.short_id());
    let current = commit.committed.format(DATE_FORMAT).to_string();
    prompter
        .prompt(&prompt, &current)
        .map(|s| s.trim().to_string())
}

/// Ask the user to confirm the history rewrite.
pub fn confirm_rewrite<P: ConfirmPrompter>(prompter: &mut P) -> Result<bool, String> {
    let prompt = "Rewrite history now? (runs an interactive rebase on this branch)";
    prompter.confirm(prompt, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    struct MockListPrompter {
        pub response: Result<Option<usize>, String>,
        pub seen_items: Vec<String>,
    }

    impl ListPrompter for MockListPrompter {
        fn select(
            &mut self,
            prompt: &str,
            items: &[String],
            default: usize,
        ) -> Result<Option<usize>, String> {
            assert_eq!(prompt, "Choose a commit (esc to quit)");
            assert_eq!(default, 0);
            self.seen_items = items.to_vec();
            self.response.clone()
        }
    }

    struct MockStringPrompter {
        pub response: Result<String, String>,
        pub expected_prompt: String,
        pub expected_default: String,
    }

    impl StringPrompter for MockStringPrompter {
        fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String> {
            assert_eq!(prompt, self.expected_prompt);
            assert_eq!(default, self.expected_default);
            self.response.clone()
        }
    }

    struct MockConfirmPrompter {
        pub response: Result<bool, String>,
    }

    impl ConfirmPrompter for MockConfirmPrompter {
        fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String> {
            assert_eq!(
                prompt,
                "Rewrite history now? (runs an interactive rebase on this branch)"
            );
            assert!(default);
            self.response.clone()
        }
    }

    fn commit(id: &str, summary: &str) -> Commit {
        let zone = FixedOffset::west_opt(4 * 3600).expect("offset");
        Commit {
            id: id.to_string(),
            summary: summary.to_string(),
            committed: DateTime::from_timestamp(1_700_000_000, 0)
                .expect("timestamp")
                .with_timezone(&zone),
        }
    }

    #[test]
    fn items_show_short_id_date_and_summary() {
        let items = commit_items(&[commit("0123456789abcdef", "Fix parser")]);
        assert_eq!(items, vec!["0123456 2023-11-14 18:13 -04:00 Fix parser"]);
    }

    #[test]
    fn choose_commit_passes_items_and_index() {
        let mut prompter = MockListPrompter {
            response: Ok(Some(1)),
            seen_items: Vec::new(),
        };
        let commits = [commit("aaaaaaaaaa", "tip"), commit("bbbbbbbbbb", "parent")];

        let result = choose_commit(&mut prompter, &commits);
        assert_eq!(result, Ok(Some(1)));
        assert_eq!(prompter.seen_items.len(), 2);
        assert!(prompter.seen_items[1].ends_with("parent"));
    }

    #[test]
    fn choose_commit_quit_is_none() {
        let mut prompter = MockListPrompter {
            response: Ok(None),
            seen_items: Vec::new(),
        };
        let result = choose_commit(&mut prompter, &[commit("aaaaaaaaaa", "tip")]);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn ask_date_defaults_to_current_date_and_trims() {
        let mut prompter = MockStringPrompter {
            response: Ok(" 2025-08-31 ".to_string()),
            expected_prompt: "New date for 0123456 (YYYY-MM-DD)".to_string(),
            expected_default: "2023-11-14".to_string(),
        };
        let result = ask_date(&mut prompter, &commit("0123456789", "msg"));
        assert_eq!(result, Ok("2025-08-31".to_string()));
    }

    #[test]
    fn ask_date_returns_error() {
        let mut prompter = MockStringPrompter {
            response: Err("input failed".to_string()),
            expected_prompt: "New date for 0123456 (YYYY-MM-DD)".to_string(),
            expected_default: "2023-11-14".to_string(),
        };
        assert!(ask_date(&mut prompter, &commit("0123456789", "msg")).is_err());
    }

    #[test]
    fn confirm_rewrite_forwards_answer() {
        let mut yes = MockConfirmPrompter { response: Ok(true) };
        let mut no = MockConfirmPrompter { response: Ok(false) };
        let mut broken = MockConfirmPrompter {
            response: Err("confirm failed".to_string()),
        };
        assert_eq!(confirm_rewrite(&mut yes), Ok(true));
        assert_eq!(confirm_rewrite(&mut no), Ok(false));
        assert!(confirm_rewrite(&mut broken).is_err());
    }
}
