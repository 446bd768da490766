//! Directory-backed post store.
//!
//! Every call goes straight to the filesystem: nothing is cached, no lock is
//! taken, and concurrent writers to the same file race with last-writer-wins.

use crate::codec::{self, DecodeError, POST_EXTENSION};
use crate::types::{PostRecord, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure.
    Io { path: PathBuf, source: io::Error },
    /// No post file with this name.
    NotFound(String),
    /// Name is not a plain file name inside the store.
    InvalidFilename(String),
    /// File exists but could not be decoded.
    Decode { filename: String, source: DecodeError },
    /// Record rejected before writing.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            StoreError::NotFound(name) => write!(f, "post not found: {}", name),
            StoreError::InvalidFilename(name) => write!(f, "invalid post filename: {:?}", name),
            StoreError::Decode { filename, source } => write!(f, "cannot read post {}: {}", filename, source),
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Decode { source, .. } => Some(source),
            StoreError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Validation(e)
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The posts directory.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
}

impl PostStore {
    /// Open the store, creating the directory if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self { dir })
    }

    /// The directory holding the post files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a post file.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StoreError> {
        check_filename(filename)?;
        Ok(self.dir.join(filename))
    }

    /// Check whether a post file exists.
    pub fn exists(&self, filename: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(filename)?.is_file())
    }

    /// List all decodable posts, newest filename first.
    ///
    /// Files that cannot be read or decoded are logged and skipped.
    pub fn list(&self) -> Result<Vec<PostRecord>, StoreError> {
        let mut filenames = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != POST_EXTENSION) {
                continue;
            }
            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => filenames.push(name.to_string()),
                None => log::warn!("Skipping non-UTF-8 filename {}", path.display()),
            }
        }

        filenames.sort_unstable_by(|a, b| b.cmp(a));

        let mut posts = Vec::with_capacity(filenames.len());
        for filename in filenames {
            match self.read(&filename) {
                Ok(post) => posts.push(post),
                Err(e) => log::warn!("Skipping {}: {}", filename, e),
            }
        }

        log::debug!("Listed {} post(s) in {}", posts.len(), self.dir.display());
        Ok(posts)
    }

    /// Read and decode a single post.
    pub fn read(&self, filename: &str) -> Result<PostRecord, StoreError> {
        let path = self.path_for(filename)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(filename.to_string()));
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let mut record = codec::decode(&contents).map_err(|source| StoreError::Decode {
            filename: filename.to_string(),
            source,
        })?;
        record.filename = filename.to_string();
        Ok(record)
    }

    /// Encode `record` and write it to `target_filename`, replacing any
    /// existing file.
    pub fn write(&self, record: &PostRecord, target_filename: &str) -> Result<(), StoreError> {
        record.validate()?;
        let path = self.path_for(target_filename)?;

        fs::write(&path, codec::encode(record)).map_err(|e| io_error(&path, e))?;

        log::info!("Wrote post {}", path.display());
        Ok(())
    }

    /// Delete a post file. Returns false if it did not exist.
    pub fn delete(&self, filename: &str) -> Result<bool, StoreError> {
        let path = self.path_for(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted post {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

/// Reject names that would escape the posts directory.
fn check_filename(filename: &str) -> Result<(), StoreError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\'])
        || Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename);

    if invalid {
        Err(StoreError::InvalidFilename(filename.to_string()))
    } else {
        Ok(())
    }
}
