//! Appending the test runner's compilation database to the firmware one.
//!
//! Entries are concatenated as raw JSON values: nothing is validated beyond
//! both files holding JSON arrays, and nothing is deduplicated.

use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Result of a merge that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The secondary database was appended; counts are entries per side.
    Merged { primary: usize, secondary: usize },
    /// There was no secondary database, so nothing was touched.
    SecondaryMissing,
}

/// Append the entries of `secondary` to `primary`, overwriting `primary`.
///
/// A missing `secondary` is expected (the test runner may never have been
/// built) and leaves `primary` untouched.
pub fn merge_files(primary: &Path, secondary: &Path) -> crate::Result<MergeOutcome> {
    if !secondary.exists() {
        info!(secondary = %secondary.display(), "no secondary compile commands, skipping merge");
        return Ok(MergeOutcome::SecondaryMissing);
    }

    let mut merged: Vec<Value> = crate::io::read_json(primary)?;
    let extra: Vec<Value> = crate::io::read_json(secondary)?;
    let outcome = MergeOutcome::Merged {
        primary: merged.len(),
        secondary: extra.len(),
    };

    merged.extend(extra);
    crate::io::write_json(primary, &merged)?;

    info!(
        primary = %primary.display(),
        secondary = %secondary.display(),
        total = merged.len(),
        "merged compile commands"
    );
    Ok(outcome)
}
