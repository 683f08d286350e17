use super::*;
use std::fs;

use git2::Repository;

use crate::config::{DEFAULT_EXCLUDE_PATHS, DEFAULT_EXTENSIONS};

const BOB_TIME: i64 = 1_700_000_000;
const ALICE_TIME: i64 = BOB_TIME - 180 * 86_400;

fn create_test_repo() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test").unwrap();
    config.set_str("user.email", "test@test.com").unwrap();
    (dir, repo)
}

fn commit_as(repo: &Repository, email: &str, epoch: i64, files: &[(&str, &str)]) {
    let sig = git2::Signature::new("Dev", email, &git2::Time::new(epoch, 0)).unwrap();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)
        .unwrap();
}

/// a.py: bob owns the first line (fresh), alice the other two (180 days
/// old). b.py declares carol as owner. empty.py has no lines.
fn sample_repo() -> (tempfile::TempDir, Repository) {
    let (dir, repo) = create_test_repo();
    commit_as(
        &repo,
        "alice@test.com",
        ALICE_TIME,
        &[
            ("a.py", "def f():\n    return 1\n\n"),
            ("b.py", "# @owner carol\nx = 1\ny = 2\n"),
            ("empty.py", ""),
            ("README.md", "# readme\n"),
            ("ext/lib.js", "var v = 1;\n"),
        ],
    );
    commit_as(
        &repo,
        "bob@test.com",
        BOB_TIME,
        &[("a.py", "def g():\n    return 1\n\n")],
    );
    (dir, repo)
}

fn default_filter() -> FileFilter {
    let exts: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
    let globs: Vec<String> = DEFAULT_EXCLUDE_PATHS.iter().map(|s| s.to_string()).collect();
    FileFilter::new(&exts, &globs)
}

fn render(dir: &Path, excluded: &[&str], json: bool) -> (String, usize) {
    let git_repo = GitRepo::open(dir).unwrap();
    let root = git_repo.root().to_path_buf();
    let files = walk::list_files(&git_repo, &default_filter()).unwrap();
    let blame = GitBlameSource::new(git_repo, None);
    let ctx = ScoringContext {
        now: BOB_TIME,
        excluded: ExclusionSet::new(excluded),
    };
    let opts = ReportOptions { top: 3, json };

    let mut out = Vec::new();
    let written = write_report(&mut out, &root, &files, &blame, &ctx, &opts).unwrap();
    (String::from_utf8(out).unwrap(), written)
}

#[test]
fn report_ranks_and_overrides() {
    let (dir, _repo) = sample_repo();
    let (csv, written) = render(dir.path(), &[], false);

    assert_eq!(written, 2);
    assert_eq!(
        csv,
        "file,line count,committer 1,line count 1,committer 2,line count 2,committer 3,line count 3\n\
         a.py,3,bob@test.com,1,alice@test.com,2\n\
         b.py,1,carol,1\n"
    );
}

#[test]
fn report_excludes_authors_case_insensitively() {
    let (dir, _repo) = sample_repo();
    let (csv, _) = render(dir.path(), &["BOB@test.com"], false);
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows, vec!["a.py,2,alice@test.com,2", "b.py,1,carol,1"]);
}

#[test]
fn report_drops_files_with_only_excluded_authors() {
    let (dir, _repo) = sample_repo();
    let (csv, written) = render(dir.path(), &["alice@test.com", "bob@test.com"], false);
    assert_eq!(written, 1, "only the annotated file remains");
    assert!(csv.ends_with("b.py,1,carol,1\n"));
}

#[test]
fn report_as_json() {
    let (dir, _repo) = sample_repo();
    let (json, written) = render(dir.path(), &[], true);
    assert_eq!(written, 2);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["file"], "a.py");
    assert_eq!(value[0]["authors"][0]["author"], "bob@test.com");
    assert_eq!(value[1]["authors"][0]["author"], "carol");
}

#[test]
fn report_skips_unreadable_files() {
    let (dir, repo) = sample_repo();
    commit_as(&repo, "alice@test.com", ALICE_TIME, &[("gone.py", "x\n")]);
    fs::remove_file(dir.path().join("gone.py")).unwrap();

    let (csv, written) = render(dir.path(), &[], false);
    assert_eq!(written, 2);
    assert!(!csv.contains("gone.py"));
}

#[test]
fn report_skips_files_missing_from_head() {
    let (dir, repo) = sample_repo();
    // staged but never committed: blame has nothing to attribute
    fs::write(dir.path().join("staged.py"), "x = 1\n").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("staged.py")).unwrap();
    index.write().unwrap();

    let (csv, written) = render(dir.path(), &[], false);
    assert_eq!(written, 2);
    assert!(!csv.contains("staged.py"));
}

#[test]
fn analyze_file_single_file() {
    let (dir, repo) = sample_repo();
    let blame = GitBlameSource::new(GitRepo::open(dir.path()).unwrap(), None);
    let ctx = ScoringContext {
        now: BOB_TIME,
        excluded: ExclusionSet::default(),
    };
    let root = repo.workdir().unwrap();

    let row = analyze_file(root, Path::new("a.py"), &blame, &ctx, 1)
        .unwrap()
        .unwrap();
    assert_eq!(row.line_count, 3);
    assert_eq!(row.authors, vec![("bob@test.com".to_string(), 1)]);

    let none = analyze_file(root, Path::new("empty.py"), &blame, &ctx, 3).unwrap();
    assert!(none.is_none());

    let err = analyze_file(root, Path::new("missing.py"), &blame, &ctx, 3).unwrap_err();
    assert!(matches!(err, EngineError::Read { .. }));
}

#[test]
fn run_on_non_git_dir() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("not_a_repo");
    fs::create_dir_all(&sub).unwrap();
    let args = AnalyzeArgs {
        path: Some(sub),
        ..Default::default()
    };
    let err = run(&args).unwrap_err();
    assert!(
        err.to_string().contains("not a git repository"),
        "should mention not a git repo, got: {err}"
    );
}

#[test]
fn run_on_sample_repo() {
    let (dir, _repo) = sample_repo();
    let args = AnalyzeArgs {
        repo: Some(dir.path().to_path_buf()),
        exclude: vec!["bob@test.com".to_string()],
        as_of: Some(BOB_TIME.to_string()),
        ..Default::default()
    };
    assert!(run(&args).is_ok());
}

#[test]
fn run_rejects_bad_config() {
    let (dir, _repo) = sample_repo();
    fs::write(dir.path().join(".ownrank.toml"), "top = -1\n").unwrap();
    let args = AnalyzeArgs {
        path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    assert!(run(&args).is_err());
}
