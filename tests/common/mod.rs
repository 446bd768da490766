//! Shared test infrastructure for postdesk integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use postdesk::{PostDraft, PostRecord, PostStore, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub workspace: Workspace,
    pub store: PostStore,
}

impl TestEnv {
    /// Create a new test environment with an empty site.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = Workspace::new(temp_dir.path());
        let store = PostStore::open(workspace.posts_dir()).expect("Failed to open store");
        Self {
            temp_dir,
            workspace,
            store,
        }
    }

    /// Build a valid record.
    pub fn record(title: &str, date: &str) -> PostRecord {
        PostRecord {
            title: title.to_string(),
            date: date.to_string(),
            author: "Ada Lovelace".to_string(),
            categories: vec!["Tech".to_string(), "Life".to_string()],
            excerpt: format!("About {}", title),
            content: format!("# {}\n\nBody of {}.", title, title),
            filename: String::new(),
        }
    }

    /// Build a valid draft.
    pub fn draft(title: &str, date: &str) -> PostDraft {
        PostDraft::from_record(&Self::record(title, date))
    }

    /// Write a valid post under the given filename.
    pub fn write_post(&self, filename: &str, title: &str, date: &str) -> PostRecord {
        let record = Self::record(title, date);
        self.store.write(&record, filename).expect("Failed to write post");
        record
    }

    /// Write raw text into the posts directory.
    pub fn write_raw(&self, filename: &str, contents: &str) -> PathBuf {
        let path = self.store.dir().join(filename);
        fs::write(&path, contents).expect("Failed to write raw file");
        path
    }

    /// Read raw text from the posts directory.
    pub fn read_raw(&self, filename: &str) -> String {
        fs::read_to_string(self.store.dir().join(filename)).expect("Failed to read raw file")
    }

    /// Filenames returned by `list()`, in order.
    pub fn listed_filenames(&self) -> Vec<String> {
        self.store
            .list()
            .expect("Failed to list posts")
            .into_iter()
            .map(|p| p.filename)
            .collect()
    }

    /// Turn the site root into a git repository on `branch` with a local identity.
    pub fn init_git(&self, branch: &str) {
        run_git(&self.workspace.root, &["init", "--quiet"]);
        run_git(&self.workspace.root, &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)]);
        run_git(&self.workspace.root, &["config", "user.name", "Test Author"]);
        run_git(&self.workspace.root, &["config", "user.email", "test@example.com"]);
        run_git(&self.workspace.root, &["config", "commit.gpgsign", "false"]);
    }

    /// Run git in the site root and return its trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.workspace.root, args)
    }

    /// Assert that a post file exists.
    pub fn assert_exists(&self, filename: &str) {
        assert!(
            self.store.exists(filename).expect("Failed to check file"),
            "Expected {} to exist. Present: {:?}",
            filename,
            self.listed_filenames()
        );
    }

    /// Assert that a post file does not exist.
    pub fn assert_absent(&self, filename: &str) {
        assert!(
            !self.store.exists(filename).expect("Failed to check file"),
            "Expected {} to be absent",
            filename
        );
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Run git in `dir`, panicking on failure.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
