//! Run configuration: `.ownrank.toml` merged with command-line flags.
//!
//! ```toml
//! extensions = ["py", "js"]
//! exclude_paths = ["**/vendor/**"]
//! exclude_authors = ["bot@example.com"]
//! top = 3
//! blame_timeout_secs = 30
//! ```
//!
//! Flags win over the file, the file wins over built-in defaults.
//! Excluded authors from both sources are combined.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::AnalyzeArgs;
use crate::util::{normalize_identities, now_unix, parse_as_of};

pub const CONFIG_FILE: &str = ".ownrank.toml";

pub const DEFAULT_EXTENSIONS: &[&str] = &["php", "py", "js", "java", "less"];

pub const DEFAULT_EXCLUDE_PATHS: &[&str] = &["ext/**", "**/ext/**", "dw/**", "**/dw/**"];

pub const DEFAULT_TOP: usize = 3;

/// Settings as written in the config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub extensions: Option<Vec<String>>,
    pub exclude_paths: Option<Vec<String>>,
    pub exclude_authors: Option<Vec<String>>,
    pub top: Option<usize>,
    pub blame_timeout_secs: Option<u64>,
}

/// Effective settings for one run.
#[derive(Debug)]
pub struct Config {
    pub source: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub exclude_paths: Vec<String>,
    /// Lower-cased identities.
    pub exclude_authors: Vec<String>,
    pub top: usize,
    pub blame_timeout: Option<Duration>,
    /// Reference "now" in unix seconds, sampled once.
    pub now: i64,
    pub json: bool,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let parsed: FileConfig = toml::from_str(&content)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
        Ok(parsed)
    }
}

impl Config {
    /// Build the effective configuration for a repository rooted at `root`.
    ///
    /// An explicit `--config` must exist; the default `.ownrank.toml` is
    /// optional.
    pub fn load(args: &AnalyzeArgs, root: &Path) -> Result<Self, Box<dyn Error>> {
        let (file, source) = match &args.config {
            Some(path) => (FileConfig::read(path)?, Some(path.clone())),
            None => {
                let default_path = root.join(CONFIG_FILE);
                if default_path.is_file() {
                    (FileConfig::read(&default_path)?, Some(default_path))
                } else {
                    (FileConfig::default(), None)
                }
            }
        };
        let mut config = Self::merge(args, file)?;
        config.source = source;
        Ok(config)
    }

    /// Combine flags and file settings over the defaults.
    pub fn merge(args: &AnalyzeArgs, file: FileConfig) -> Result<Self, Box<dyn Error>> {
        let extensions = if !args.ext.is_empty() {
            args.ext.clone()
        } else {
            file.extensions
                .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect())
        };
        let extensions = extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let exclude_paths = if !args.exclude_path.is_empty() {
            args.exclude_path.clone()
        } else {
            file.exclude_paths
                .unwrap_or_else(|| DEFAULT_EXCLUDE_PATHS.iter().map(|s| s.to_string()).collect())
        };

        let mut exclude_authors = normalize_identities(&args.exclude);
        for author in normalize_identities(file.exclude_authors.iter().flatten()) {
            if !exclude_authors.contains(&author) {
                exclude_authors.push(author);
            }
        }

        let top = args.top.or(file.top).unwrap_or(DEFAULT_TOP);
        if top == 0 {
            return Err("--top must be at least 1".into());
        }

        let blame_timeout = args
            .blame_timeout
            .or(file.blame_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let now = match &args.as_of {
            Some(s) => parse_as_of(s)?,
            None => now_unix(),
        };

        Ok(Self {
            source: None,
            extensions,
            exclude_paths,
            exclude_authors,
            top,
            blame_timeout,
            now,
            json: args.json,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
