//! In-memory providers for tests, examples and dry runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::provider::{ContentLookup, ContentProvider, MetadataProvider, TagLookup, TagSet};

/// A vault that lives entirely in memory.
///
/// Documents are registered up front with `with_*` builders; lookups can be
/// forced into their failure outcomes per path, and fetch counters expose
/// how often the engine actually asked.
#[derive(Debug, Default)]
pub struct MemoryVault {
    content: HashMap<String, String>,
    tags: HashMap<String, TagSet>,
    unavailable_metadata: HashSet<String>,
    unreadable_content: HashSet<String>,
    tag_fetches: AtomicUsize,
    content_fetches: AtomicUsize,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, path: &str, content: &str) -> Self {
        self.content.insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_tagged_doc(mut self, path: &str, content: &str, tags: &[&str]) -> Self {
        self.tags.insert(path.to_string(), tags.iter().collect());
        self.with_doc(path, content)
    }

    /// The path exists but every tag lookup for it reports `Unavailable`.
    pub fn with_unavailable_metadata(mut self, path: &str) -> Self {
        self.unavailable_metadata.insert(path.to_string());
        self
    }

    /// The path exists but every content lookup for it reports `Unreadable`.
    pub fn with_unreadable_content(mut self, path: &str) -> Self {
        self.unreadable_content.insert(path.to_string());
        self
    }

    /// How many tag lookups have been served, successful or not.
    pub fn tag_fetches(&self) -> usize {
        self.tag_fetches.load(Ordering::Relaxed)
    }

    /// How many content lookups have been served, successful or not.
    pub fn content_fetches(&self) -> usize {
        self.content_fetches.load(Ordering::Relaxed)
    }

    fn exists(&self, path: &str) -> bool {
        self.content.contains_key(path)
            || self.tags.contains_key(path)
            || self.unavailable_metadata.contains(path)
            || self.unreadable_content.contains(path)
    }
}

#[async_trait]
impl MetadataProvider for MemoryVault {
    async fn tags(&self, path: &str) -> TagLookup {
        self.tag_fetches.fetch_add(1, Ordering::Relaxed);
        if self.unavailable_metadata.contains(path) {
            return TagLookup::Unavailable;
        }
        if !self.exists(path) {
            return TagLookup::NotFound;
        }
        TagLookup::Found(self.tags.get(path).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ContentProvider for MemoryVault {
    async fn content(&self, path: &str) -> ContentLookup {
        self.content_fetches.fetch_add(1, Ordering::Relaxed);
        if self.unreadable_content.contains(path) {
            return ContentLookup::Unreadable;
        }
        match self.content.get(path) {
            Some(text) => ContentLookup::Loaded(text.clone()),
            // Registered without content (tags only): an empty document.
            None if self.exists(path) => ContentLookup::Loaded(String::new()),
            None => ContentLookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookups_report_the_configured_outcomes() {
        let vault = MemoryVault::new()
            .with_tagged_doc("a.md", "body", &["#x"])
            .with_unavailable_metadata("b.md")
            .with_unreadable_content("c.md");

        assert!(matches!(vault.tags("a.md").await, TagLookup::Found(_)));
        assert_eq!(vault.tags("b.md").await, TagLookup::Unavailable);
        assert_eq!(vault.tags("missing.md").await, TagLookup::NotFound);

        assert_eq!(
            vault.content("a.md").await,
            ContentLookup::Loaded("body".to_string())
        );
        assert_eq!(vault.content("c.md").await, ContentLookup::Unreadable);
        assert_eq!(vault.content("missing.md").await, ContentLookup::NotFound);

        assert_eq!(vault.tag_fetches(), 3);
        assert_eq!(vault.content_fetches(), 3);
    }
}
