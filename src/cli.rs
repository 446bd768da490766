//! CLI argument parsing for postdesk.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "postdesk",
    about = "Manage Jekyll blog posts and publish them with git",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/postdesk/logs/postdesk.log"
)]
pub struct Cli {
    /// Path to the site root containing _posts (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Write files only; do not commit or push
    #[arg(long, global = true)]
    pub no_commit: bool,

    /// Commit but do not push
    #[arg(long, global = true)]
    pub no_push: bool,

    /// Run the site build after each change
    #[arg(long, global = true)]
    pub build: bool,

    /// Git remote to push to
    #[arg(long, global = true, default_value = "origin")]
    pub remote: String,

    /// Branch to push; repeat to try several in order (default: main, then master)
    #[arg(long = "branch", global = true)]
    pub branches: Vec<String>,

    /// Site build command (default: bundle exec jekyll build)
    #[arg(long, global = true)]
    pub build_command: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Post fields shared by `new` and `edit`.
#[derive(Args, Debug, Default)]
pub struct PostFields {
    /// Post title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Author (new posts default to author.name in _config.yml)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Categories (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Short summary
    #[arg(short, long)]
    pub excerpt: Option<String>,

    /// Date as YYYY-MM-DD (new posts default to today)
    #[arg(short = 'D', long)]
    pub date: Option<String>,

    /// Markdown body
    #[arg(short = 'C', long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read the Markdown body from a file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List posts, newest first
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one post
    Show {
        /// Post filename, e.g. 2024-01-05-hello-world.md
        filename: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new post
    New(PostFields),

    /// Edit an existing post; unspecified fields keep their values
    Edit {
        /// Post filename
        filename: String,

        #[command(flatten)]
        fields: PostFields,
    },

    /// Delete a post
    Delete {
        /// Post filename
        filename: String,
    },

    /// Print the filename a title and date would get
    Slug {
        /// Post title
        title: String,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(short = 'D', long)]
        date: Option<String>,
    },

    /// Run the site build
    Build,
}
