use std::error::Error;
use std::path::{Path, PathBuf};

use git2::{BlameOptions, Repository};

use crate::ownership::source::LineAttribution;

/// Index mode of a gitlink (submodule) entry.
const GITLINK_MODE: u32 = 0o160000;

pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
}

impl GitRepo {
    pub fn open(path: &Path) -> Result<Self, Box<dyn Error>> {
        let repo = Repository::discover(path)?;
        let root = repo
            .workdir()
            .ok_or("bare repositories are not supported")?
            .to_path_buf();
        Ok(Self { repo, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths tracked in the index, relative to the root, in index order
    /// (the same order `git ls-files` prints). Submodules are skipped and
    /// conflicted paths appear once.
    pub fn tracked_files(&self) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let index = self.repo.index()?;
        let mut files: Vec<PathBuf> = Vec::with_capacity(index.len());

        for entry in index.iter() {
            if entry.mode & 0o170000 == GITLINK_MODE {
                continue;
            }
            let path = PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned());
            if files.last() != Some(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Blame `rel_path` at HEAD and return one attribution per line, in
    /// line order. Whitespace-only changes do not reassign a line.
    ///
    /// The identity of a line is the author e-mail of the commit that last
    /// touched it; invalid UTF-8 is replaced rather than rejected.
    pub fn blame_lines(&self, rel_path: &Path) -> Result<Vec<LineAttribution>, Box<dyn Error>> {
        let mut opts = BlameOptions::new();
        opts.ignore_whitespace(true);
        let blame = self.repo.blame_file(rel_path, Some(&mut opts))?;

        let mut lines = Vec::new();
        for hunk in blame.iter() {
            let sig = hunk.final_signature();
            let attribution = LineAttribution {
                author: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
                timestamp: sig.when().seconds(),
            };
            lines.extend(std::iter::repeat_n(attribution, hunk.lines_in_hunk()));
        }
        Ok(lines)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
