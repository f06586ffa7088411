//! # vault-fs
//!
//! Filesystem-backed providers for the policy engine: documents live under
//! a single vault root, paths are vault-relative, and tags are read from
//! the documents themselves (front-matter plus inline `#tags`).
//!
//! Lookup semantics follow the provider contract: a path that does not
//! resolve to a file inside the root is `NotFound`, a file that exists but
//! cannot be read maps to the fail-closed outcome for its lookup kind.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use acl_engine::{ContentLookup, ContentProvider, MetadataProvider, TagLookup, TagSet};

mod tags;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault root is not a directory: {0}")]
    RootNotADirectory(PathBuf),
    #[error("failed to compile tag pattern: {0}")]
    TagPattern(#[from] regex::Error),
}

/// A document vault rooted at one directory.
#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    inline_tag: Regex,
}

impl FsVault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VaultError::RootNotADirectory(root));
        }
        let inline_tag = Regex::new(tags::INLINE_TAG_PATTERN)?;
        Ok(Self { root, inline_tag })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a vault-relative path onto the filesystem. Absolute paths and
    /// paths that step outside the root (`..`) do not resolve; to the
    /// engine such candidates simply do not exist.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        if path.is_empty() {
            return None;
        }
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    debug!(path, "rejected non-vault path");
                    return None;
                }
            }
        }
        Some(self.root.join(relative))
    }

    /// Read a document as text, classifying failures.
    async fn read_document(&self, path: &str) -> DocumentRead {
        let Some(full) = self.resolve(path) else {
            return DocumentRead::Missing;
        };
        let meta = match tokio::fs::metadata(&full).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return DocumentRead::Missing,
            Err(err) => {
                debug!(path, error = %err, "failed to stat vault path");
                return DocumentRead::Failed;
            }
        };
        if meta.is_dir() {
            return DocumentRead::Directory;
        }
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => DocumentRead::Text(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => DocumentRead::Missing,
            Err(err) => {
                debug!(path, error = %err, "failed to read vault document");
                DocumentRead::Failed
            }
        }
    }
}

enum DocumentRead {
    Text(String),
    Directory,
    Missing,
    Failed,
}

#[async_trait]
impl MetadataProvider for FsVault {
    async fn tags(&self, path: &str) -> TagLookup {
        match self.read_document(path).await {
            DocumentRead::Text(text) => {
                TagLookup::Found(tags::extract_tags(&self.inline_tag, &text))
            }
            // Folders exist but carry no tags of their own.
            DocumentRead::Directory => TagLookup::Found(TagSet::new()),
            DocumentRead::Missing => TagLookup::NotFound,
            DocumentRead::Failed => TagLookup::Unavailable,
        }
    }
}

#[async_trait]
impl ContentProvider for FsVault {
    async fn content(&self, path: &str) -> ContentLookup {
        match self.read_document(path).await {
            DocumentRead::Text(text) => ContentLookup::Loaded(text),
            // Folders have no text content to match keywords against.
            DocumentRead::Directory => ContentLookup::NotFound,
            DocumentRead::Missing => ContentLookup::NotFound,
            DocumentRead::Failed => ContentLookup::Unreadable,
        }
    }
}
