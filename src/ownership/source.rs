//! Where a file's ownership comes from: an in-file `@owner` override or
//! per-line blame data.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::annotation;
use super::error::EngineError;
use crate::git::GitRepo;

/// Authorship of one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAttribution {
    /// Opaque identity, usually an e-mail address.
    pub author: String,
    /// Author time of the commit that last touched the line, unix seconds.
    pub timestamp: i64,
}

/// Resolved ownership input for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipSource {
    /// Composite identity from `@owner` markers; blame is not consulted.
    Override(String),
    /// One entry per line, in line order.
    Blamed(Vec<LineAttribution>),
}

impl OwnershipSource {
    /// Scan `content` for markers and fall back to `blame` only when there
    /// are none.
    pub fn resolve(
        rel_path: &Path,
        content: &[u8],
        blame: &dyn BlameSource,
    ) -> Result<Self, EngineError> {
        match annotation::scan(content) {
            Some(owner) => {
                debug!("{}: owner override {owner:?}", rel_path.display());
                Ok(Self::Override(owner))
            }
            None => Ok(Self::Blamed(blame.blame(rel_path)?)),
        }
    }
}

/// Per-line blame provider.
pub trait BlameSource {
    /// Attribution for every line of `rel_path` at HEAD, in line order.
    /// An empty vector means the file has no attributable lines.
    fn blame(&self, rel_path: &Path) -> Result<Vec<LineAttribution>, EngineError>;
}

/// Blame backed by the repository through libgit2.
pub struct GitBlameSource {
    repo: GitRepo,
    timeout: Option<Duration>,
}

impl GitBlameSource {
    pub fn new(repo: GitRepo, timeout: Option<Duration>) -> Self {
        Self { repo, timeout }
    }
}

impl BlameSource for GitBlameSource {
    fn blame(&self, rel_path: &Path) -> Result<Vec<LineAttribution>, EngineError> {
        let Some(timeout) = self.timeout else {
            return self.repo.blame_lines(rel_path).map_err(|e| EngineError::Blame {
                path: rel_path.to_path_buf(),
                reason: e.to_string(),
            });
        };

        // A libgit2 handle cannot be shared across threads, so the worker
        // opens its own.
        let root = self.repo.root().to_path_buf();
        let path = rel_path.to_path_buf();
        let job = move || {
            GitRepo::open(&root)
                .and_then(|repo| repo.blame_lines(&path))
                .map_err(|e| e.to_string())
        };

        match call_with_timeout(timeout, job) {
            Some(Ok(lines)) => Ok(lines),
            Some(Err(reason)) => Err(EngineError::Blame {
                path: rel_path.to_path_buf(),
                reason,
            }),
            None => Err(EngineError::Timeout {
                path: rel_path.to_path_buf(),
                timeout,
            }),
        }
    }
}

/// Run `job` on a worker thread and wait at most `timeout` for it.
/// Returns `None` on timeout; the worker is left to finish on its own.
pub fn call_with_timeout<T, F>(timeout: Duration, job: F) -> Option<Result<T, String>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // receiver may be gone after a timeout
        let _ = tx.send(job());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Err("blame worker panicked".to_string())),
    }
}

/// In-memory blame data keyed by path, for tests.
#[cfg(test)]
pub struct FakeBlame {
    files: std::collections::HashMap<std::path::PathBuf, Vec<LineAttribution>>,
    calls: std::cell::Cell<usize>,
}

#[cfg(test)]
impl FakeBlame {
    pub fn new() -> Self {
        Self {
            files: std::collections::HashMap::new(),
            calls: std::cell::Cell::new(0),
        }
    }

    pub fn with_file(mut self, path: &str, lines: &[(&str, i64)]) -> Self {
        let lines = lines
            .iter()
            .map(|(author, timestamp)| LineAttribution {
                author: author.to_string(),
                timestamp: *timestamp,
            })
            .collect();
        self.files.insert(path.into(), lines);
        self
    }

    /// Number of `blame` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[cfg(test)]
impl BlameSource for FakeBlame {
    fn blame(&self, rel_path: &Path) -> Result<Vec<LineAttribution>, EngineError> {
        self.calls.set(self.calls.get() + 1);
        self.files
            .get(rel_path)
            .cloned()
            .ok_or_else(|| EngineError::Blame {
                path: rel_path.to_path_buf(),
                reason: "no such file".to_string(),
            })
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
