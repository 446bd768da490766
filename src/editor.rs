//! Create, update and delete posts, then publish the change.
//!
//! The file operation is the only step that can fail the call. The build,
//! commit and push that follow are reported in `Publication` and never undo
//! the file change.

use crate::git::{CommitOutcome, SiteBuilder, VersionControl};
use crate::store::{PostStore, StoreError};
use crate::types::{PostDraft, PostRecord};
use eyre::{Context, Result};

/// Outcome of one publishing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus<T = ()> {
    /// Not configured, or an earlier step failed.
    Skipped,
    Done(T),
    Failed(String),
}

impl<T> StepStatus<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepStatus::Failed(_))
    }
}

impl<T> From<Result<T>> for StepStatus<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => StepStatus::Done(value),
            Err(e) => StepStatus::Failed(format!("{:#}", e)),
        }
    }
}

/// What happened after the file was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub message: String,
    pub build: StepStatus,
    pub commit: StepStatus<CommitOutcome>,
    pub push: StepStatus,
}

impl Publication {
    fn skipped(message: String) -> Self {
        Self {
            message,
            build: StepStatus::Skipped,
            commit: StepStatus::Skipped,
            push: StepStatus::Skipped,
        }
    }

    /// True if any configured step failed.
    pub fn has_failures(&self) -> bool {
        self.build.is_failed() || self.commit.is_failed() || self.push.is_failed()
    }
}

/// Result of a create or update.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub record: PostRecord,
    /// Previous filename when an edit changed the title or date
    pub renamed_from: Option<String>,
    pub publication: Publication,
}

/// Result of a delete.
#[derive(Debug, Clone)]
pub struct RemoveReport {
    pub filename: String,
    pub title: String,
    /// False if the file was already gone
    pub removed: bool,
    pub publication: Publication,
}

/// Runs post edits against a store and its publishing collaborators.
pub struct Editor<'a> {
    store: &'a PostStore,
    vcs: Option<&'a dyn VersionControl>,
    builder: Option<&'a dyn SiteBuilder>,
    push: bool,
}

impl<'a> Editor<'a> {
    /// Create an editor that only touches files.
    pub fn new(store: &'a PostStore) -> Self {
        Self {
            store,
            vcs: None,
            builder: None,
            push: true,
        }
    }

    /// Commit (and push) after every change.
    pub fn with_vcs(mut self, vcs: &'a dyn VersionControl) -> Self {
        self.vcs = Some(vcs);
        self
    }

    /// Rebuild the site after every change.
    pub fn with_builder(mut self, builder: &'a dyn SiteBuilder) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Commit without pushing.
    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    /// Validate and write a new post.
    pub fn create(&self, draft: PostDraft) -> Result<SaveReport> {
        let record = draft.into_record().map_err(StoreError::from)?;

        self.store
            .write(&record, &record.filename)
            .context("Failed to write post")?;

        let publication = self.publish(format!("Post created: {}", record.title));
        Ok(SaveReport {
            record,
            renamed_from: None,
            publication,
        })
    }

    /// Replace an existing post. When the derived filename changes, the new
    /// file is written before the old one is removed.
    pub fn update(&self, original_filename: &str, draft: PostDraft) -> Result<SaveReport> {
        if !self.store.exists(original_filename)? {
            return Err(StoreError::NotFound(original_filename.to_string()).into());
        }

        let record = draft.into_record().map_err(StoreError::from)?;

        self.store
            .write(&record, &record.filename)
            .context("Failed to write post")?;

        let renamed_from = if record.filename != original_filename {
            self.store
                .delete(original_filename)
                .with_context(|| format!("Wrote {} but failed to remove {}", record.filename, original_filename))?;
            log::info!("Renamed {} -> {}", original_filename, record.filename);
            Some(original_filename.to_string())
        } else {
            None
        };

        let publication = self.publish(format!("Post updated: {}", record.title));
        Ok(SaveReport {
            record,
            renamed_from,
            publication,
        })
    }

    /// Delete a post.
    pub fn remove(&self, filename: &str) -> Result<RemoveReport> {
        let title = match self.store.read(filename) {
            Ok(record) => record.title,
            Err(StoreError::InvalidFilename(name)) => return Err(StoreError::InvalidFilename(name).into()),
            Err(e) => {
                log::debug!("Deleting {} without reading its title: {}", filename, e);
                String::new()
            }
        };
        let title = if title.is_empty() { filename.to_string() } else { title };

        let removed = self.store.delete(filename).context("Failed to delete post")?;
        let message = format!("Post deleted: {}", title);
        let publication = if removed {
            self.publish(message)
        } else {
            Publication::skipped(message)
        };

        Ok(RemoveReport {
            filename: filename.to_string(),
            title,
            removed,
            publication,
        })
    }

    fn publish(&self, message: String) -> Publication {
        let mut publication = Publication::skipped(message);

        if let Some(builder) = self.builder {
            publication.build = builder.build().into();
        }

        let Some(vcs) = self.vcs else {
            return publication;
        };

        let paths = vec![self.store.dir().to_path_buf()];
        publication.commit = vcs.stage_and_commit(&paths, &publication.message).into();
        if let StepStatus::Failed(e) = &publication.commit {
            log::warn!("Commit failed, not pushing: {}", e);
            return publication;
        }

        if self.push {
            publication.push = vcs.push().into();
        }
        publication
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingVcs {
        commits: RefCell<Vec<(Vec<PathBuf>, String)>>,
        pushes: RefCell<usize>,
        fail_commit: bool,
    }

    impl VersionControl for RecordingVcs {
        fn stage_and_commit(&self, paths: &[PathBuf], message: &str) -> Result<CommitOutcome> {
            if self.fail_commit {
                eyre::bail!("commit refused");
            }
            self.commits.borrow_mut().push((paths.to_vec(), message.to_string()));
            Ok(CommitOutcome::Committed)
        }

        fn push(&self) -> Result<()> {
            *self.pushes.borrow_mut() += 1;
            Ok(())
        }
    }

    fn setup() -> (TempDir, PostStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = PostStore::open(temp_dir.path().join("_posts")).unwrap();
        (temp_dir, store)
    }

    fn draft(title: &str, date: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            date: date.to_string(),
            author: "Ada".to_string(),
            categories: vec!["Tech".to_string()],
            excerpt: "Excerpt".to_string(),
            content: "Body".to_string(),
        }
    }

    #[test]
    fn test_create_without_collaborators() {
        let (_temp_dir, store) = setup();
        let report = Editor::new(&store).create(draft("Hello", "2024-01-05")).unwrap();

        assert_eq!(report.record.filename, "2024-01-05-hello.md");
        assert!(store.exists("2024-01-05-hello.md").unwrap());
        assert_eq!(report.publication.commit, StepStatus::Skipped);
        assert!(!report.publication.has_failures());
    }

    #[test]
    fn test_create_commits_and_pushes() {
        let (_temp_dir, store) = setup();
        let vcs = RecordingVcs::default();
        let report = Editor::new(&store).with_vcs(&vcs).create(draft("Hello", "2024-01-05")).unwrap();

        assert_eq!(report.publication.commit, StepStatus::Done(CommitOutcome::Committed));
        assert_eq!(report.publication.push, StepStatus::Done(()));
        let commits = vcs.commits.borrow();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0, vec![store.dir().to_path_buf()]);
        assert_eq!(commits[0].1, "Post created: Hello");
        assert_eq!(*vcs.pushes.borrow(), 1);
    }

    #[test]
    fn test_without_push() {
        let (_temp_dir, store) = setup();
        let vcs = RecordingVcs::default();
        let report = Editor::new(&store)
            .with_vcs(&vcs)
            .without_push()
            .create(draft("Hello", "2024-01-05"))
            .unwrap();

        assert_eq!(report.publication.push, StepStatus::Skipped);
        assert_eq!(*vcs.pushes.borrow(), 0);
    }

    #[test]
    fn test_commit_failure_keeps_file_and_skips_push() {
        let (_temp_dir, store) = setup();
        let vcs = RecordingVcs {
            fail_commit: true,
            ..Default::default()
        };
        let report = Editor::new(&store).with_vcs(&vcs).create(draft("Hello", "2024-01-05")).unwrap();

        assert!(report.publication.commit.is_failed());
        assert_eq!(report.publication.push, StepStatus::Skipped);
        assert!(store.exists("2024-01-05-hello.md").unwrap());
        assert_eq!(*vcs.pushes.borrow(), 0);
    }

    #[test]
    fn test_invalid_draft_writes_nothing() {
        let (_temp_dir, store) = setup();
        let vcs = RecordingVcs::default();
        let result = Editor::new(&store).with_vcs(&vcs).create(draft("", "2024-01-05"));

        assert!(result.is_err());
        assert!(store.list().unwrap().is_empty());
        assert!(vcs.commits.borrow().is_empty());
    }

    #[test]
    fn test_update_same_filename() {
        let (_temp_dir, store) = setup();
        let editor = Editor::new(&store);
        editor.create(draft("Hello", "2024-01-05")).unwrap();

        let mut changed = draft("Hello", "2024-01-05");
        changed.content = "New body".to_string();
        let report = editor.update("2024-01-05-hello.md", changed).unwrap();

        assert_eq!(report.renamed_from, None);
        assert_eq!(store.read("2024-01-05-hello.md").unwrap().content, "New body");
    }

    #[test]
    fn test_update_renames() {
        let (_temp_dir, store) = setup();
        let editor = Editor::new(&store);
        editor.create(draft("Hello", "2024-01-05")).unwrap();

        let report = editor.update("2024-01-05-hello.md", draft("Hello again", "2024-02-01")).unwrap();

        assert_eq!(report.renamed_from.as_deref(), Some("2024-01-05-hello.md"));
        assert!(!store.exists("2024-01-05-hello.md").unwrap());
        assert!(store.exists("2024-02-01-hello-again.md").unwrap());
    }

    #[test]
    fn test_update_missing_original_fails() {
        let (_temp_dir, store) = setup();
        let result = Editor::new(&store).update("missing.md", draft("Hello", "2024-01-05"));
        assert!(result.is_err());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let (_temp_dir, store) = setup();
        let vcs = RecordingVcs::default();
        let editor = Editor::new(&store).with_vcs(&vcs);
        editor.create(draft("Hello", "2024-01-05")).unwrap();

        let report = editor.remove("2024-01-05-hello.md").unwrap();
        assert!(report.removed);
        assert_eq!(report.title, "Hello");
        assert_eq!(vcs.commits.borrow().last().unwrap().1, "Post deleted: Hello");

        let report = editor.remove("2024-01-05-hello.md").unwrap();
        assert!(!report.removed);
        assert_eq!(report.publication.commit, StepStatus::Skipped);
        assert_eq!(vcs.commits.borrow().len(), 2);
    }

    #[test]
    fn test_remove_undecodable_uses_filename() {
        let (_temp_dir, store) = setup();
        std::fs::write(store.dir().join("broken.md"), "no front matter").unwrap();

        let report = Editor::new(&store).remove("broken.md").unwrap();
        assert!(report.removed);
        assert_eq!(report.title, "broken.md");
    }
}
