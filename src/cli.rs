/// CLI argument definitions for the `ownrank` command.
///
/// The default invocation analyzes a repository; the `completions`
/// subcommand prints shell completion scripts.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Top-level CLI parser. Analysis flags live at the top level so that
/// `ownrank -r repo -e bot@x.com` works without a subcommand.
#[derive(Parser)]
#[command(
    name = "ownrank",
    version,
    about = "Per-file code ownership from git blame",
    long_about = "\
Compute per-file code ownership for a git repository.

For every tracked source file, lines are attributed to their authors via
git blame (whitespace-only changes ignored) and each author gets a
recency-weighted score:

  weight(line) = 1 / (1 + age_days / 90)

A line written today weighs 1.0, a 90-day-old line 0.5. Authors are
ranked by score; the report shows each top author's raw line count.

A file containing `@owner <name>` markers is attributed entirely to the
named owner(s) (joined with `;`) and blame is not consulted.

Output is CSV on stdout:
  file,line count,committer 1,line count 1,committer 2,line count 2,...

Examples:
  ownrank                               # current repository
  ownrank -r ~/src/app -e bot@ci.com    # exclude an author
  ownrank --ext rs,toml --top 5         # Rust files, five authors
  ownrank --as-of 2024-01-01 --json     # reproducible JSON output"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Arguments for the ownership analysis.
#[derive(clap::Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Repository to analyze (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Repository to analyze (alternative to the positional PATH)
    #[arg(short, long, value_name = "PATH", conflicts_with = "path")]
    pub repo: Option<PathBuf>,

    /// Comma-separated author identities to exclude (case-insensitive)
    #[arg(short, long, value_delimiter = ',', value_name = "x,y,z")]
    pub exclude: Vec<String>,

    /// Number of top authors per file (default: 3)
    #[arg(long)]
    pub top: Option<usize>,

    /// Comma-separated extension allow-list (default: php,py,js,java,less)
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub ext: Vec<String>,

    /// Glob for paths to skip; repeatable (default: ext/ and dw/ directories)
    #[arg(long, value_name = "GLOB")]
    pub exclude_path: Vec<String>,

    /// Reference time for decay: YYYY-MM-DD or unix seconds (default: now)
    #[arg(long, value_name = "WHEN")]
    pub as_of: Option<String>,

    /// Abort blame for a single file after this many seconds
    #[arg(long, value_name = "SECS")]
    pub blame_timeout: Option<u64>,

    /// Output as JSON instead of CSV
    #[arg(long)]
    pub json: bool,

    /// Config file (default: .ownrank.toml at the repository root)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// The repository path chosen via `-r` or the positional argument.
    pub fn target(&self) -> PathBuf {
        self.repo
            .clone()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print shell completions to stdout
    Completions {
        /// Target shell
        shell: Shell,
    },

    /// Write `@owner` headers into files from an ownership CSV report
    #[command(long_about = "\
Write `@owner` headers into files listed in an ownership CSV report.

The first committer of each row becomes the declared owner of the file.
Headers are added as:
  .php    docblock after the first <?php (or <?) tag
  .less   // @owner line at the top
  other   /** @owner **/ docblock at the top

Files that already contain an @owner marker and Python files are left
unchanged. Paths are relative to the repository root.

Examples:
  ownrank > owners.csv && ownrank stamp owners.csv
  ownrank stamp owners.csv --dry-run")]
    Stamp {
        /// Ownership report produced by `ownrank`
        csv: PathBuf,

        /// Repository whose files are stamped (default: current directory)
        #[arg(long, value_name = "PATH")]
        git: Option<PathBuf>,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },
}
