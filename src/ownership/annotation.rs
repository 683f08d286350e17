//! In-file ownership markers.
//!
//! A line containing `@owner <name>` (marker matched case-insensitively)
//! declares `<name>` as an owner of the whole file. Several markers are
//! joined with `;` in the order they appear.

use std::sync::LazyLock;

use regex::Regex;

static OWNER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@owner\s+(\S.*)$").expect("owner marker regex is valid"));

/// Separator between owners of a composite identity.
pub const OWNER_SEPARATOR: &str = ";";

/// Scan raw file bytes for ownership markers. Invalid UTF-8 is replaced,
/// never rejected. Returns `None` when the file declares no owner.
pub fn scan(content: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(content);
    let owners: Vec<&str> = text
        .lines()
        .filter_map(|line| OWNER_MARKER.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end())
        .collect();

    if owners.is_empty() {
        None
    } else {
        Some(owners.join(OWNER_SEPARATOR))
    }
}

#[cfg(test)]
#[path = "annotation_test.rs"]
mod tests;
