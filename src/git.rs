//! Publishing collaborators: version control and the site build.
//!
//! Both are reached through narrow traits so the editor workflow never
//! depends on how they run. The shipped implementations shell out.

use eyre::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Default remote to push to.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branches tried in order when pushing.
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

/// Default static-site build command.
pub const DEFAULT_BUILD_COMMAND: [&str; 4] = ["bundle", "exec", "jekyll", "build"];

/// `git commit` stdout lines that mean nothing was staged.
const NOTHING_TO_COMMIT: [&str; 3] = ["nothing to commit", "nothing added to commit", "no changes added to commit"];

/// Result of a successful commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created.
    Committed,
    /// The working tree had no staged changes.
    NothingToCommit,
}

/// Stage, commit and push changes to the post directory.
pub trait VersionControl {
    /// Stage `paths` and commit them with `message`.
    fn stage_and_commit(&self, paths: &[PathBuf], message: &str) -> Result<CommitOutcome>;

    /// Push committed changes to the remote.
    fn push(&self) -> Result<()>;
}

/// Regenerate the static site.
pub trait SiteBuilder {
    fn build(&self) -> Result<()>;
}

fn run(program: &str, args: &[&str], cwd: &Path) -> Result<Output> {
    log::debug!("Running {} {:?} in {}", program, args, cwd.display());
    Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("Failed to execute {}", program))
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// `VersionControl` backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Repository working directory
    pub repo_dir: PathBuf,

    /// Remote name
    pub remote: String,

    /// Branches to push, first success wins
    pub branches: Vec<String>,
}

impl GitCli {
    /// Create a git client with the default remote and branches.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: DEFAULT_REMOTE.to_string(),
            branches: DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// Set the remote name.
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Replace the branches tried on push.
    pub fn branches(mut self, branches: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.branches = branches.into_iter().map(|b| b.into()).collect();
        self
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        run("git", args, &self.repo_dir)
    }

    /// Express `path` relative to the repository, since git runs from `repo_dir`.
    fn pathspec(&self, path: &Path) -> PathBuf {
        if let Ok(relative) = path.strip_prefix(&self.repo_dir) {
            return non_empty(relative);
        }
        let (Ok(repo), Ok(absolute)) = (self.repo_dir.canonicalize(), path.canonicalize()) else {
            return path.to_path_buf();
        };
        match absolute.strip_prefix(&repo) {
            Ok(relative) => non_empty(relative),
            Err(_) => absolute,
        }
    }
}

fn non_empty(relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative.to_path_buf()
    }
}

impl VersionControl for GitCli {
    fn stage_and_commit(&self, paths: &[PathBuf], message: &str) -> Result<CommitOutcome> {
        let path_args: Vec<String> = paths
            .iter()
            .map(|p| self.pathspec(p).to_string_lossy().into_owned())
            .collect();
        let mut add_args = vec!["add", "-A", "--"];
        add_args.extend(path_args.iter().map(String::as_str));

        let output = self.git(&add_args)?;
        if !output.status.success() {
            bail!("git add failed: {}", stderr_of(&output));
        }

        let output = self.git(&["commit", "-m", message])?;
        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if NOTHING_TO_COMMIT.iter().any(|marker| stdout.contains(marker)) {
                log::info!("git: nothing to commit");
                return Ok(CommitOutcome::NothingToCommit);
            }
            bail!("git commit failed: {}", stderr_of(&output));
        }

        log::info!("git: committed \"{}\"", message);
        Ok(CommitOutcome::Committed)
    }

    fn push(&self) -> Result<()> {
        if self.branches.is_empty() {
            bail!("git push failed: no branch configured");
        }

        let mut last_error = String::new();
        for branch in &self.branches {
            let output = self.git(&["push", self.remote.as_str(), branch.as_str()])?;
            if output.status.success() {
                log::info!("git: pushed {} {}", self.remote, branch);
                return Ok(());
            }
            last_error = stderr_of(&output);
            log::warn!("git push {} {} failed: {}", self.remote, branch, last_error);
        }

        bail!("git push failed: {}", last_error)
    }
}

/// `SiteBuilder` that runs an external command.
#[derive(Debug, Clone)]
pub struct ShellBuild {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ShellBuild {
    /// Build with `bundle exec jekyll build`.
    pub fn jekyll(cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_BUILD_COMMAND[0].to_string(),
            args: DEFAULT_BUILD_COMMAND[1..].iter().map(|a| a.to_string()).collect(),
            cwd: cwd.into(),
        }
    }

    /// Parse a whitespace-separated command line.
    pub fn from_command_line(command: &str, cwd: impl Into<PathBuf>) -> Result<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let Some(program) = parts.next() else {
            bail!("build command is empty");
        };
        Ok(Self {
            program,
            args: parts.collect(),
            cwd: cwd.into(),
        })
    }
}

impl SiteBuilder for ShellBuild {
    fn build(&self) -> Result<()> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let output = run(&self.program, &args, &self.cwd)?;
        if !output.status.success() {
            bail!("{} exited with {}: {}", self.program, output.status, stderr_of(&output));
        }
        log::info!("Site build finished");
        Ok(())
    }
}
