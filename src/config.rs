//! Site layout and the read-only settings postdesk takes from `_config.yml`.

use eyre::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Posts directory name within the site root.
pub const POSTS_DIR: &str = "_posts";

/// Jekyll site configuration file name.
pub const CONFIG_FILE: &str = "_config.yml";

/// Layout of a Jekyll site on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Site root (usually also the git repository root)
    pub root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the posts directory path.
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(POSTS_DIR)
    }

    /// Get the site config path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

/// Read-only configuration consumed when pre-filling a new post.
pub trait ConfigProvider {
    /// Author name to suggest for new posts; empty when unknown.
    fn default_author(&self) -> String;
}

/// `author` as Jekyll sites write it: a plain name or a mapping with `name`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Profile {
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawSiteConfig {
    #[serde(default)]
    author: Option<AuthorField>,
}

/// The parts of `_config.yml` postdesk cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfig {
    pub author: Option<String>,
}

impl SiteConfig {
    /// Parse site config from YAML text.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<RawSiteConfig> = serde_yaml::from_str(text).context("Failed to parse site config")?;
        let author = raw
            .and_then(|r| r.author)
            .and_then(|a| match a {
                AuthorField::Name(name) => Some(name),
                AuthorField::Profile { name } => name,
            })
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Ok(Self { author })
    }

    /// Load site config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid site config {}", path.display()))
    }

    /// Load site config, falling back to defaults if it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No site config at {}", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring site config: {:#}", e);
                Self::default()
            }
        }
    }
}

impl ConfigProvider for SiteConfig {
    fn default_author(&self) -> String {
        self.author.clone().unwrap_or_default()
    }
}
