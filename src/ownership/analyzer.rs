use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use tracing::debug;

use super::error::EngineError;
use super::report::ReportRow;
use super::source::{BlameSource, LineAttribution, OwnershipSource};

/// Age at which a line's weight drops to one half.
pub const HALF_WEIGHT_DAYS: f64 = 90.0;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between `timestamp` and `now`. Timestamps in the future
/// count as age zero.
pub fn age_days(timestamp: i64, now: i64) -> i64 {
    now.saturating_sub(timestamp).max(0) / SECONDS_PER_DAY
}

/// Recency weight of a line: 1.0 when fresh, 0.5 at 90 days, tending to
/// zero with age.
pub fn recency_weight(timestamp: i64, now: i64) -> f64 {
    1.0 / (1.0 + age_days(timestamp, now) as f64 / HALF_WEIGHT_DAYS)
}

/// Author identities whose lines are ignored. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    authors: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            authors: authors
                .into_iter()
                .map(|a| a.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, author: &str) -> bool {
        !self.authors.is_empty() && self.authors.contains(&author.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

/// Raw line count and weighted score of one author within a file.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorStats {
    pub author: String,
    pub lines: usize,
    pub score: f64,
}

/// Per-file tallies, in order of each author's first appearance.
#[derive(Debug, Default)]
pub struct AuthorAccumulator {
    authors: Vec<AuthorStats>,
    index: HashMap<String, usize>,
    total_lines: usize,
}

impl AuthorAccumulator {
    /// A file owned outright through `@owner` markers: one line, score 1.
    pub fn from_override(owner: String) -> Self {
        let mut acc = Self::default();
        acc.record(&owner, 1.0);
        acc
    }

    /// Tally blamed lines, skipping excluded authors entirely.
    pub fn from_blame(lines: &[LineAttribution], now: i64, excluded: &ExclusionSet) -> Self {
        let mut acc = Self::default();
        for line in lines {
            if excluded.contains(&line.author) {
                continue;
            }
            acc.record(&line.author, recency_weight(line.timestamp, now));
        }
        acc
    }

    fn record(&mut self, author: &str, weight: f64) {
        let slot = match self.index.get(author) {
            Some(&i) => i,
            None => {
                self.authors.push(AuthorStats {
                    author: author.to_string(),
                    lines: 0,
                    score: 0.0,
                });
                self.index.insert(author.to_string(), self.authors.len() - 1);
                self.authors.len() - 1
            }
        };
        let stats = &mut self.authors[slot];
        stats.lines += 1;
        stats.score += weight;
        self.total_lines += 1;
    }

    /// Lines counted toward scoring.
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Per-author tallies in order of first appearance.
    pub fn authors(&self) -> &[AuthorStats] {
        &self.authors
    }

    /// Up to `n` authors with their raw line counts, highest score first.
    /// Equal scores keep the order in which the authors first appeared.
    pub fn top_authors(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<&AuthorStats> = self.authors.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
            .into_iter()
            .take(n)
            .map(|s| (s.author.clone(), s.lines))
            .collect()
    }
}

/// Inputs shared by every file of one run.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Reference time for decay, sampled once per run.
    pub now: i64,
    pub excluded: ExclusionSet,
}

enum State {
    Unprocessed,
    Processed(AuthorAccumulator),
}

/// Ownership of a single file. Populating is done at most once; later
/// calls are no-ops.
pub struct FileOwnership {
    path: PathBuf,
    state: State,
}

impl FileOwnership {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: State::Unprocessed,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Processed(_))
    }

    /// Resolve the file's ownership source from its `content` (override
    /// markers) or `blame`, then tally it. On error the file stays
    /// unprocessed.
    pub fn populate(
        &mut self,
        content: &[u8],
        blame: &dyn BlameSource,
        ctx: &ScoringContext,
    ) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }

        let acc = match OwnershipSource::resolve(&self.path, content, blame)? {
            OwnershipSource::Override(owner) => AuthorAccumulator::from_override(owner),
            OwnershipSource::Blamed(lines) => {
                AuthorAccumulator::from_blame(&lines, ctx.now, &ctx.excluded)
            }
        };
        debug!(
            "{}: {} lines, {} authors",
            self.path.display(),
            acc.total_lines(),
            acc.authors().len()
        );
        self.state = State::Processed(acc);
        Ok(())
    }

    pub fn accumulator(&self) -> Option<&AuthorAccumulator> {
        match &self.state {
            State::Processed(acc) => Some(acc),
            State::Unprocessed => None,
        }
    }

    /// The report row with the top `n` authors, or `None` when nothing
    /// was counted (or the file was never populated).
    pub fn row(&self, n: usize) -> Option<ReportRow> {
        let acc = self.accumulator()?;
        ReportRow::new(&self.path, acc.total_lines(), acc.top_authors(n))
    }
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
