//! End-to-end tests against throw-away git repositories.

use anyhow::Result;
use commit_stats::{
    analyze_commits, compute_commit_stats, store, ChangeAction, CommitStatsCalculator,
    ContentFilter, DeletePolicy, KindStats, ObjectStore, RangeOptions, Stats, SyntaxClassifier,
};
use git2::{Oid, Repository};
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn create_test_repo() -> Result<(TempDir, Repository)> {
    let dir = tempdir()?;
    let repo = Repository::init(dir.path())?;

    let mut config = repo.config()?;
    config.set_str("user.name", "Test User")?;
    config.set_str("user.email", "test@example.com")?;

    Ok((dir, repo))
}

/// Applies `changes` (path, new content or `None` to delete) and commits them
/// on top of HEAD.
fn commit(repo: &Repository, changes: &[(&str, Option<&str>)], message: &str) -> Result<Oid> {
    let workdir = repo.workdir().expect("test repos have a workdir");
    let mut index = repo.index()?;

    for (path, content) in changes {
        let full = workdir.join(path);
        match content {
            Some(text) => {
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&full, text)?;
                index.add_path(Path::new(path))?;
            }
            None => {
                std::fs::remove_file(&full)?;
                index.remove_path(Path::new(path))?;
            }
        }
    }
    index.write()?;

    let tree = repo.find_tree(index.write_tree()?)?;
    let sig = repo.signature()?;
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit()?],
        Err(_) => vec![],
    };
    let parents: Vec<&git2::Commit> = parents.iter().collect();
    Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
}

#[test]
fn test_root_commit_has_no_stats() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    let root = commit(&repo, &[("README.md", Some("hello\n"))], "Initial commit")?;

    assert_eq!(compute_commit_stats(&repo, root)?, None);
    Ok(())
}

#[test]
fn test_new_file() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    commit(&repo, &[("README.md", Some("hello\n"))], "Initial commit")?;
    let head = commit(
        &repo,
        &[("src/lib.rs", Some("fn a() {}\n\nfn b() {}\nfn c() {}\n"))],
        "Add lib",
    )?;

    let stats = compute_commit_stats(&repo, head)?.expect("has a parent");
    assert_eq!(stats.code, KindStats { additions: 3, deletions: 0 });
    assert_eq!(stats.blank, KindStats { additions: 1, deletions: 0 });
    assert_eq!(stats.files, 1);
    Ok(())
}

#[test]
fn test_modified_vendored_file_is_ignored() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    commit(&repo, &[("vendor/lib/lib.go", Some("package lib\n"))], "Vendor lib")?;
    let head = commit(
        &repo,
        &[("vendor/lib/lib.go", Some("package lib\n\nfunc X() {}\n"))],
        "Bump vendored lib",
    )?;

    assert_eq!(compute_commit_stats(&repo, head)?, Some(Stats::default()));
    Ok(())
}

#[test]
fn test_bag_of_lines_modify() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    commit(&repo, &[("x.go", Some("a\nb\na\n"))], "Initial commit")?;
    let head = commit(&repo, &[("x.go", Some("a\na\na\n"))], "More a")?;

    let stats = compute_commit_stats(&repo, head)?.expect("has a parent");
    assert_eq!(stats.code, KindStats { additions: 1, deletions: 1 });
    assert_eq!(stats.files, 1);
    Ok(())
}

#[test]
fn test_moved_lines_are_unchanged() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    commit(&repo, &[("m.py", Some("import os\n\n# util\nx = 1\n"))], "Initial commit")?;
    let head = commit(&repo, &[("m.py", Some("x = 1\n    # util\nimport os\n\n"))], "Shuffle")?;

    let stats = compute_commit_stats(&repo, head)?.expect("has a parent");
    assert_eq!(stats, Stats { files: 1, ..Stats::default() });
    Ok(())
}

#[test]
fn test_deleted_file_policies() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    commit(&repo, &[("a.c", Some("/* a */\nint a;\n")), ("b.c", Some("int b;\n"))], "Initial")?;
    let head = commit(&repo, &[("a.c", None)], "Drop a")?;

    let legacy = compute_commit_stats(&repo, head)?.expect("has a parent");
    assert_eq!(legacy.total, KindStats { additions: 2, deletions: 0 });

    let classifier = SyntaxClassifier::default();
    let filter = ContentFilter::default();
    let fixed = CommitStatsCalculator::new(&repo, &classifier, &filter)
        .with_delete_policy(DeletePolicy::AsDeletions)
        .compute(head)?
        .expect("has a parent");
    assert_eq!(fixed.code, KindStats { additions: 0, deletions: 1 });
    assert_eq!(fixed.comment, KindStats { additions: 0, deletions: 1 });
    assert_eq!(fixed.files, 1);
    Ok(())
}

#[test]
fn test_binary_file_is_skipped() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    commit(&repo, &[("README.md", Some("hello\n"))], "Initial commit")?;
    let head = commit(
        &repo,
        &[("logo.png", Some("\u{89}PNG\0\0\0\rIHDR")), ("main.go", Some("package main\n"))],
        "Add logo",
    )?;

    let stats = compute_commit_stats(&repo, head)?.expect("has a parent");
    assert_eq!(stats.files, 1);
    assert_eq!(stats.code.additions, 1);
    Ok(())
}

#[test]
fn test_diff_records() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    let first = commit(&repo, &[("a.rs", Some("a\n")), ("b.rs", Some("b\n"))], "Initial")?;
    let second = commit(
        &repo,
        &[("a.rs", Some("a2\n")), ("b.rs", None), ("c.rs", Some("c\n"))],
        "Shuffle files",
    )?;

    assert_eq!(repo.parent_of(second)?, Some(first));
    assert_eq!(repo.parent_of(first)?, None);

    let mut changes = repo.diff_trees(Some(first), second)?;
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    let actions: Vec<_> = changes.iter().map(|c| (c.path.as_str(), c.action)).collect();
    assert_eq!(
        actions,
        vec![
            ("a.rs", ChangeAction::Modify),
            ("b.rs", ChangeAction::Delete),
            ("c.rs", ChangeAction::Insert),
        ]
    );
    assert!(changes[1].new.is_none());
    assert_eq!(repo.read_blob(changes[2].new.expect("insert has a blob"))?, b"c\n");
    Ok(())
}

#[test]
fn test_between_and_by_file() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    let first = commit(&repo, &[("a.rs", Some("fn a() {}\n"))], "Initial")?;
    commit(&repo, &[("a.rs", Some("fn a() {}\n// note\n"))], "Comment")?;
    let third = commit(&repo, &[("LICENSE", Some("MIT\n"))], "License")?;

    let classifier = SyntaxClassifier::default();
    let filter = ContentFilter::default();
    let calc = CommitStatsCalculator::new(&repo, &classifier, &filter);

    let span = calc.between(first, third)?;
    assert_eq!(span.files, 2);
    assert_eq!(span.comment.additions, 1);
    assert_eq!(span.code, KindStats::default());

    let files = calc.by_file(third)?.expect("has a parent");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "LICENSE");
    assert_eq!(files[0].language, None);
    Ok(())
}

#[test]
fn test_analyze_range_in_parallel() -> Result<()> {
    let (dir, repo) = create_test_repo()?;
    let root = commit(&repo, &[("a.rs", Some("fn a() {}\n"))], "Initial")?;
    let second = commit(&repo, &[("b.rs", Some("fn b() {}\n"))], "Add b")?;
    let third = commit(&repo, &[("a.rs", None)], "Drop a")?;

    assert_eq!(store::commits_in_range(&repo, &root.to_string(), "HEAD")?, vec![second, third]);

    let options = RangeOptions { by_file: true, ..RangeOptions::default() };
    let reports = analyze_commits(
        dir.path(),
        &[root, second, third],
        &SyntaxClassifier::default(),
        &ContentFilter::default(),
        2,
        &options,
    )?;

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].commit, root.to_string());
    assert_eq!(reports[0].stats, None);
    assert_eq!(reports[1].summary, "Add b");
    assert_eq!(reports[1].files[0].path, "b.rs");
    assert_eq!(reports[2].stats.expect("has a parent").code.additions, 1);
    Ok(())
}

#[test]
fn test_root_commit_against_empty_tree() -> Result<()> {
    let (dir, repo) = create_test_repo()?;
    let root = commit(
        &repo,
        &[("a.rs", Some("// a\nfn a() {}\n")), ("vendor/x/x.go", Some("package x\n"))],
        "Initial",
    )?;

    let mut changes = repo.diff_trees(None, root)?;
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    assert!(changes.iter().all(|c| c.action == ChangeAction::Insert));
    assert_eq!(changes.len(), 2);

    let classifier = SyntaxClassifier::default();
    let filter = ContentFilter::default();
    let stats = CommitStatsCalculator::new(&repo, &classifier, &filter).against_empty(root)?;
    assert_eq!(stats.files, 1);
    assert_eq!(stats.code, KindStats { additions: 1, deletions: 0 });
    assert_eq!(stats.comment, KindStats { additions: 1, deletions: 0 });

    let options = RangeOptions { root_against_empty: true, ..RangeOptions::default() };
    let reports = analyze_commits(dir.path(), &[root], &classifier, &filter, 1, &options)?;
    assert_eq!(reports[0].stats, Some(stats));
    Ok(())
}

#[test]
fn test_submodule_entries_are_skipped() -> Result<()> {
    let (_dir, repo) = create_test_repo()?;
    let first = commit(&repo, &[("a.rs", Some("fn a() {}\n"))], "Initial")?;
    let parent = repo.find_commit(first)?;

    // A gitlink entry points at a commit of another repository
    let sub = Oid::from_str("0123456789abcdef0123456789abcdef01234567")?;
    let blob = repo.blob(b"fn b() {}\n")?;
    let mut builder = repo.treebuilder(Some(&parent.tree()?))?;
    builder.insert("sub", sub, 0o160000)?;
    builder.insert("b.rs", blob, 0o100644)?;
    let tree = repo.find_tree(builder.write()?)?;

    let sig = repo.signature()?;
    let second = repo.commit(Some("HEAD"), &sig, &sig, "Add submodule", &tree, &[&parent])?;

    let paths: Vec<_> = repo.diff_trees(Some(first), second)?.into_iter().map(|c| c.path).collect();
    assert_eq!(paths, vec!["b.rs".to_string()]);

    let stats = compute_commit_stats(&repo, second)?.expect("has a parent");
    assert_eq!(stats.files, 1);
    assert_eq!(stats.code.additions, 1);
    Ok(())
}
