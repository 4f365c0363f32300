use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::git::GitRunner;
use crate::history::Selection;

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleanup {
    /// Entries deleted.
    pub deleted: usize,
    /// Entries the rewrite was measured to add, when known.
    pub created: Option<usize>,
}

impl Cleanup {
    /// True when a measurement exists and differs from what was deleted.
    pub fn mismatched(&self) -> bool {
        self.created.is_some_and(|c| c != self.deleted)
    }
}

/// Number of `HEAD` reflog entries to drop after redating `selection`.
///
/// A rebase start, the amend, the continue and the final head move make up
/// `overhead`; each commit above the selected one adds a replayed pick.
pub fn heuristic_count(selection: Selection, overhead: usize) -> usize {
    selection.index() + overhead
}

/// Deletes the newest `count` entries one at a time.
///
/// When `created` holds a measured count that differs from `count`, a
/// warning is logged, but `count` is still what gets deleted.
///
/// # Returns
///
/// * `Ok(Cleanup)` after all `count` deletions.
/// * `Err(Error::ReflogCleanup)` at the first failed deletion; entries
///   already deleted stay deleted.
pub fn clean<G: GitRunner + ?Sized>(git: &G, count: usize, created: Option<usize>) -> Result<Cleanup> {
    if let Some(created) = created {
        if created != count {
            warn!(
                created,
                deleting = count,
                "reflog entry count differs from the expected number for this rewrite"
            );
        }
    }

    for entry in 1..=count {
        git.delete_newest_reflog_entry()
            .map_err(|reason| Error::ReflogCleanup {
                entry,
                total: count,
                reason,
            })?;
        debug!(entry, total = count, "deleted reflog entry");
    }

    Ok(Cleanup {
        deleted: count,
        created,
    })
}
