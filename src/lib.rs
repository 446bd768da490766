//! postdesk: manage Jekyll blog posts from the command line.
//!
//! Posts live as Markdown files with YAML front matter in a site's `_posts`
//! directory. postdesk reads and writes them in a fixed layout, derives
//! `YYYY-MM-DD-slug.md` filenames from title and date, and hands commits,
//! pushes and site builds to external tools.
//!
//! # Example
//!
//! ```no_run
//! use postdesk::{Editor, GitCli, PostDraft, PostStore, Workspace};
//!
//! let workspace = Workspace::new(".");
//! let store = PostStore::open(workspace.posts_dir()).unwrap();
//! let git = GitCli::new(&workspace.root);
//!
//! let draft = PostDraft {
//!     title: "Hello, World!".to_string(),
//!     date: "2024-01-05".to_string(),
//!     author: "Ada".to_string(),
//!     categories: vec!["Tech, Life".to_string()],
//!     excerpt: "First post".to_string(),
//!     content: "Welcome.".to_string(),
//! };
//!
//! let report = Editor::new(&store).with_vcs(&git).create(draft).unwrap();
//! assert_eq!(report.record.filename, "2024-01-05-hello-world.md");
//!
//! for post in store.list().unwrap() {
//!     println!("{} {}", post.date, post.title);
//! }
//! ```

mod types;

pub mod codec;
pub mod config;
pub mod editor;
pub mod git;
pub mod store;

// Re-export public API
pub use codec::{DecodeError, decode, derive_filename, encode, slugify};
pub use config::{ConfigProvider, SiteConfig, Workspace};
pub use editor::{Editor, Publication, RemoveReport, SaveReport, StepStatus};
pub use git::{CommitOutcome, GitCli, ShellBuild, SiteBuilder, VersionControl};
pub use store::{PostStore, StoreError};
pub use types::{PostDraft, PostRecord, ValidationError, parse_categories};
