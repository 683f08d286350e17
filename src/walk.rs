use std::error::Error;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::git::GitRepo;

/// Decides which tracked files take part in the ownership report.
///
/// A file passes when its extension is in the allow-list (or the list is
/// empty), it matches none of the exclusion globs, and its path does not
/// start with a dot.
pub struct FileFilter {
    extensions: Vec<String>,
    globs: GlobSet,
    glob_count: usize,
}

impl FileFilter {
    /// Build a filter from an extension allow-list and path globs.
    /// Extensions are compared case-insensitively with any leading dot
    /// removed. Invalid globs are skipped with a warning.
    pub fn new(extensions: &[String], exclude_globs: &[String]) -> Self {
        let extensions = extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let mut builder = GlobSetBuilder::new();
        let mut glob_count = 0;
        for pattern in exclude_globs.iter().filter(|p| !p.is_empty()) {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    glob_count += 1;
                }
                Err(e) => warn!("ignoring invalid exclude pattern {pattern:?}: {e}"),
            }
        }
        let globs = builder.build().unwrap_or_else(|e| {
            warn!("ignoring exclude patterns: {e}");
            glob_count = 0;
            GlobSet::empty()
        });

        Self {
            extensions,
            globs,
            glob_count,
        }
    }

    /// Whether the filter lets every file through.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.glob_count == 0
    }

    /// `rel_path` is relative to the repository root, `/`-separated.
    pub fn accepts(&self, rel_path: &Path) -> bool {
        if rel_path.to_string_lossy().starts_with('.') {
            return false;
        }
        if !self.extension_allowed(rel_path) {
            return false;
        }
        !self.globs.is_match(rel_path)
    }

    fn extension_allowed(&self, rel_path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        rel_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }
}

/// List the tracked files of `repo` that pass `filter`, in index order.
pub fn list_files(repo: &GitRepo, filter: &FileFilter) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if filter.is_empty() {
        debug!("no file filter, selecting every visible tracked file");
    }
    let tracked = repo.tracked_files()?;
    let total = tracked.len();
    let files: Vec<PathBuf> = tracked.into_iter().filter(|p| filter.accepts(p)).collect();
    debug!("{} of {total} tracked files selected", files.len());
    Ok(files)
}

#[cfg(test)]
#[path = "walk_test.rs"]
mod tests;
