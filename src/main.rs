//! postdesk CLI - manage Jekyll blog posts and publish them with git.

use chrono::Local;
use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;
use postdesk::codec::DATE_FORMAT;
use postdesk::{
    ConfigProvider, Editor, GitCli, PostDraft, PostRecord, PostStore, Publication, ShellBuild, SiteBuilder, SiteConfig,
    StepStatus, Workspace, derive_filename,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

mod cli;

use cli::{Cli, Command, PostFields};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("postdesk")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("postdesk.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_site_dir(cli: &Cli) -> Result<PathBuf> {
    let dir = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    std::path::absolute(&dir).with_context(|| format!("Failed to resolve site directory {}", dir.display()))
}

fn make_git(cli: &Cli, workspace: &Workspace) -> GitCli {
    let git = GitCli::new(&workspace.root).remote(cli.remote.clone());
    if cli.branches.is_empty() {
        git
    } else {
        git.branches(cli.branches.clone())
    }
}

fn make_builder(cli: &Cli, workspace: &Workspace) -> Result<ShellBuild> {
    match &cli.build_command {
        Some(command) => ShellBuild::from_command_line(command, &workspace.root),
        None => Ok(ShellBuild::jekyll(&workspace.root)),
    }
}

fn read_body(fields: &PostFields) -> Result<Option<String>> {
    if let Some(content) = &fields.content {
        return Ok(Some(content.clone()));
    }
    match &fields.file {
        Some(path) if path == Path::new("-") => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read content from stdin")?;
            Ok(Some(body))
        }
        Some(path) => {
            let body = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Some(body))
        }
        None => Ok(None),
    }
}

/// Overlay command-line fields on a draft.
fn apply_fields(mut draft: PostDraft, fields: PostFields) -> Result<PostDraft> {
    if let Some(content) = read_body(&fields)? {
        draft.content = content;
    }
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(author) = fields.author {
        draft.author = author;
    }
    if let Some(categories) = fields.categories {
        draft.categories = categories;
    }
    if let Some(excerpt) = fields.excerpt {
        draft.excerpt = excerpt;
    }
    if let Some(date) = fields.date {
        draft.date = date;
    }
    Ok(draft)
}

fn print_step<T>(name: &str, status: &StepStatus<T>, done: impl FnOnce(&T) -> String) {
    match status {
        StepStatus::Skipped => {}
        StepStatus::Done(value) => println!("  {} {}: {}", "✓".green(), name, done(value)),
        StepStatus::Failed(e) => println!("  {} {} failed: {}", "✗".red(), name, e),
    }
}

fn print_publication(publication: &Publication) {
    print_step("build", &publication.build, |_| "done".to_string());
    print_step("commit", &publication.commit, |outcome| match outcome {
        postdesk::CommitOutcome::Committed => publication.message.clone(),
        postdesk::CommitOutcome::NothingToCommit => "nothing to commit".to_string(),
    });
    print_step("push", &publication.push, |_| "done".to_string());
}

fn print_post(post: &PostRecord) {
    println!("{}: {}", "File".bold(), post.filename.cyan());
    println!("{}: {}", "Title".bold(), post.title);
    println!("{}: {}", "Date".bold(), post.date);
    println!("{}: {}", "Author".bold(), post.author);
    if !post.categories.is_empty() {
        println!("{}: {}", "Categories".bold(), post.categories.join(", "));
    }
    println!("{}: {}", "Excerpt".bold(), post.excerpt);
    println!();
    println!("{}", post.content);
}

fn run(cli: Cli) -> Result<()> {
    let workspace = Workspace::new(get_site_dir(&cli)?);
    let store = PostStore::open(workspace.posts_dir()).context("Failed to open posts directory")?;

    let git = make_git(&cli, &workspace);
    let builder = make_builder(&cli, &workspace)?;
    let mut editor = Editor::new(&store);
    if !cli.no_commit {
        editor = editor.with_vcs(&git);
    }
    if cli.no_push {
        editor = editor.without_push();
    }
    if cli.build {
        editor = editor.with_builder(&builder);
    }

    match cli.command {
        Command::List { json } => {
            let posts = store.list().context("Failed to list posts")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else if posts.is_empty() {
                println!("{}", "No posts found".dimmed());
            } else {
                for post in &posts {
                    println!("{} {} {}", post.date, post.title, post.filename.dimmed());
                }
                println!("{}", format!("{} post(s)", posts.len()).dimmed());
            }
        }

        Command::Show { filename, json } => {
            let post = store.read(&filename).context("Failed to load post")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                print_post(&post);
            }
        }

        Command::New(fields) => {
            let site_config = SiteConfig::load_or_default(&workspace.config_path());
            let draft = PostDraft {
                author: site_config.default_author(),
                date: Local::now().format(DATE_FORMAT).to_string(),
                ..Default::default()
            };
            let draft = apply_fields(draft, fields)?;

            let report = editor.create(draft).context("Failed to create post")?;
            println!(
                "{} Created: {} {}",
                "✓".green(),
                report.record.filename.cyan(),
                report.record.title
            );
            print_publication(&report.publication);
        }

        Command::Edit { filename, fields } => {
            let existing = store.read(&filename).context("Failed to load post")?;
            let draft = apply_fields(PostDraft::from_record(&existing), fields)?;

            let report = editor.update(&filename, draft).context("Failed to update post")?;
            match &report.renamed_from {
                Some(old) => println!(
                    "{} Updated: {} {} {}",
                    "✓".green(),
                    old.dimmed(),
                    "→".blue(),
                    report.record.filename.cyan()
                ),
                None => println!("{} Updated: {}", "✓".green(), report.record.filename.cyan()),
            }
            print_publication(&report.publication);
        }

        Command::Delete { filename } => {
            let report = editor.remove(&filename).context("Failed to delete post")?;

            if !report.removed {
                eprintln!("{} Post not found: {}", "✗".red(), filename);
                std::process::exit(1);
            }
            println!("{} Deleted: {} {}", "✓".green(), report.filename.cyan(), report.title);
            print_publication(&report.publication);
        }

        Command::Slug { title, date } => {
            let date = date.unwrap_or_default();
            println!("{}", derive_filename(&title, &date));
        }

        Command::Build => {
            println!("{} Building site in {}", "→".blue(), workspace.root.display());
            if let Err(e) = builder.build() {
                bail!("Site build failed: {:#}", e);
            }
            println!("{} Site built", "✓".green());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
