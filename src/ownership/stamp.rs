//! Write `@owner` headers back into source files from an ownership CSV.
//!
//! Each record's first committer becomes the declared owner of the file,
//! so later runs take the override path instead of blame. Files that
//! already declare an owner and Python files are left alone.

use std::error::Error;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use super::annotation;
use crate::git::GitRepo;

/// Outcome counts of a stamping pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StampSummary {
    pub stamped: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Split CSV text into records. Quoted fields may contain commas, doubled
/// quotes and line breaks.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// `(file, first committer)` pairs from a report, header and rows without
/// a committer dropped.
pub fn owners_from_csv(text: &str) -> Vec<(String, String)> {
    parse_csv(text)
        .into_iter()
        .filter(|r| r.len() > 2 && !r[2].is_empty())
        .filter(|r| !(r[0] == "file" && r[2] == "committer 1"))
        .map(|mut r| {
            let owner = r.swap_remove(2);
            (r.swap_remove(0), owner)
        })
        .collect()
}

/// Content of `rel_path` with an owner header added, or `None` when the
/// file should not be touched.
///
/// PHP gets a docblock right after the first `<?php` (or `<?`) opening
/// tag, LESS a line comment, everything else a leading docblock.
pub fn stamp_content(rel_path: &Path, content: &str, owner: &str) -> Option<String> {
    let ext = rel_path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "py" || annotation::scan(content.as_bytes()).is_some() {
        return None;
    }

    let docblock = format!("/**\n * @owner {owner}\n **/\n");
    match ext {
        "php" => {
            let tag = ["<?php", "<?"].into_iter().find(|t| content.contains(*t))?;
            Some(content.replacen(tag, &format!("{tag}\n{docblock}"), 1))
        }
        "less" => Some(format!("// @owner {owner}\n{content}")),
        _ => Some(format!("{docblock}{content}")),
    }
}

/// Reject absolute paths and `..` so a report cannot write outside the
/// repository.
fn confined_path(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    if rel
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        Some(root.join(rel))
    } else {
        None
    }
}

/// Stamp every file listed in `csv_text` under `root`.
pub fn stamp_files(root: &Path, csv_text: &str, dry_run: bool) -> StampSummary {
    let mut summary = StampSummary::default();

    for (file, owner) in owners_from_csv(csv_text) {
        let Some(full_path) = confined_path(root, &file) else {
            warn!("refusing path outside the repository: {file}");
            summary.failed += 1;
            continue;
        };
        let content = match fs::read(&full_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("cannot read {file}: {e}");
                summary.failed += 1;
                continue;
            }
        };

        let Some(stamped) = stamp_content(Path::new(&file), &content, &owner) else {
            summary.skipped += 1;
            continue;
        };

        info!("{file}: @owner {owner}");
        if !dry_run && let Err(e) = fs::write(&full_path, stamped) {
            warn!("cannot write {file}: {e}");
            summary.failed += 1;
            continue;
        }
        summary.stamped += 1;
    }
    summary
}

/// Read an ownership report and stamp the files of the repository
/// containing `path`.
pub fn run(csv_path: &Path, path: &Path, dry_run: bool) -> Result<(), Box<dyn Error>> {
    let git_repo =
        GitRepo::open(path).map_err(|e| format!("not a git repository (or any parent): {e}"))?;
    let csv_text = fs::read_to_string(csv_path)
        .map_err(|e| format!("cannot read {}: {e}", csv_path.display()))?;

    let summary = stamp_files(git_repo.root(), &csv_text, dry_run);
    let verb = if dry_run { "would stamp" } else { "stamped" };
    println!(
        "{verb} {} files ({} already owned or skipped, {} failed)",
        summary.stamped, summary.skipped, summary.failed
    );
    Ok(())
}

#[cfg(test)]
#[path = "stamp_test.rs"]
mod tests;
