//! Ownership maps: who owns each file, ranked by recency-weighted blame.
//!
//! Every line's author earns `1 / (1 + age_days / 90)`; authors are ranked
//! by the sum and reported with their raw line counts. Files carrying
//! `@owner` markers bypass blame and are attributed to the declared
//! owners. Excluded authors' lines are dropped before counting.

pub mod analyzer;
pub mod annotation;
pub mod error;
pub mod report;
pub mod source;
pub mod stamp;

use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::git::GitRepo;
use crate::walk::{self, FileFilter};

use analyzer::{ExclusionSet, FileOwnership, ScoringContext};
use error::EngineError;
use report::{ReportRow, write_csv_header, write_csv_row, write_json};
use source::{BlameSource, GitBlameSource};

/// Output options for one report.
pub struct ReportOptions {
    pub top: usize,
    pub json: bool,
}

/// Compute the ownership row for one file. `Ok(None)` means nothing was
/// counted and the file is left out of the report.
pub fn analyze_file(
    root: &Path,
    rel_path: &Path,
    blame: &dyn BlameSource,
    ctx: &ScoringContext,
    top: usize,
) -> Result<Option<ReportRow>, EngineError> {
    let full_path = root.join(rel_path);
    let content = fs::read(&full_path).map_err(|source| EngineError::Read {
        path: rel_path.to_path_buf(),
        source,
    })?;

    let mut file = FileOwnership::new(rel_path.to_path_buf());
    file.populate(&content, blame, ctx)?;
    Ok(file.row(top))
}

/// Analyze `files` in order and write the report to `out`. Files that fail
/// are logged and skipped. Returns the number of rows written.
pub fn write_report<W: Write>(
    out: &mut W,
    root: &Path,
    files: &[PathBuf],
    blame: &dyn BlameSource,
    ctx: &ScoringContext,
    opts: &ReportOptions,
) -> Result<usize, Box<dyn Error>> {
    if !opts.json {
        write_csv_header(out, opts.top)?;
    }

    let mut rows = Vec::new();
    let mut written = 0;
    let mut skipped = 0;

    for rel_path in files {
        let row = match analyze_file(root, rel_path, blame, ctx, opts.top) {
            Ok(Some(row)) => row,
            Ok(None) => continue,
            Err(e) => {
                warn!("skipping {e}");
                skipped += 1;
                continue;
            }
        };

        if opts.json {
            rows.push(row);
        } else {
            write_csv_row(out, &row)?;
        }
        written += 1;
    }

    if opts.json {
        write_json(out, &rows)?;
    }
    out.flush()?;

    info!(
        "{} files analyzed, {written} rows, {skipped} skipped",
        files.len()
    );
    Ok(written)
}

/// Run ownership analysis on the repository containing `args.target()`
/// and print the report to stdout.
pub fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let target = args.target();
    let git_repo = GitRepo::open(&target)
        .map_err(|e| format!("not a git repository (or any parent): {e}"))?;
    let root = git_repo.root().to_path_buf();

    let config = Config::load(args, &root)?;
    if let Some(source) = &config.source {
        info!("config: {}", source.display());
    }

    let filter = FileFilter::new(&config.extensions, &config.exclude_paths);
    let files = walk::list_files(&git_repo, &filter)?;

    let ctx = ScoringContext {
        now: config.now,
        excluded: ExclusionSet::new(&config.exclude_authors),
    };
    if !ctx.excluded.is_empty() {
        info!("excluding {} authors", config.exclude_authors.len());
    }

    let blame = GitBlameSource::new(git_repo, config.blame_timeout);
    let opts = ReportOptions {
        top: config.top,
        json: config.json,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_report(&mut out, &root, &files, &blame, &ctx, &opts)?;
    Ok(())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
