//! Provider traits the engine pulls document metadata and content through.
//!
//! The engine never touches storage itself. Tag and keyword stages ask these
//! traits, and the three-way results let the evaluation chain distinguish
//! "does not exist" (no opinion, keep going) from "exists but could not be
//! read" (fail closed).

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;

/// Canonical tag form: leading `#`, lowercase.
pub fn normalize_tag(raw: &str) -> String {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);
    format!("#{}", bare.to_lowercase())
}

/// A document's tags, stored normalized so comparisons are exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw tag in any accepted spelling (`#Secret`, `secret`, ...).
    /// Empty tags are dropped.
    pub fn insert(&mut self, raw: &str) {
        let tag = normalize_tag(raw);
        if tag.len() > 1 {
            self.tags.insert(tag);
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.tags.contains(&normalize_tag(raw))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for raw in iter {
            set.insert(raw.as_ref());
        }
        set
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}

/// Result of asking for a candidate's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLookup {
    /// The candidate does not exist; tag-based stages have no opinion.
    NotFound,
    /// The candidate exists but its metadata could not be produced.
    /// Stages that need tags must treat this as a denial.
    Unavailable,
    Found(TagSet),
}

/// Result of asking for a candidate's text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLookup {
    /// The candidate does not exist; the keyword stage has no opinion.
    NotFound,
    /// The candidate exists but its content could not be read.
    /// The keyword stage must treat this as a denial.
    Unreadable,
    Loaded(String),
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn tags(&self, path: &str) -> TagLookup;
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn content(&self, path: &str) -> ContentLookup;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_case_and_prefix_insensitive() {
        assert_eq!(normalize_tag("#Secret"), "#secret");
        assert_eq!(normalize_tag("Secret"), "#secret");
        assert_eq!(normalize_tag("  #Work/Q3  "), "#work/q3");
    }

    #[test]
    fn tag_set_matches_any_spelling() {
        let mut tags = TagSet::new();
        tags.insert("#Public");
        tags.insert("work");

        assert!(tags.contains("public"));
        assert!(tags.contains("#PUBLIC"));
        assert!(tags.contains("#work"));
        assert!(!tags.contains("#private"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn empty_tags_are_dropped() {
        let mut tags = TagSet::new();
        tags.insert("");
        tags.insert("   ");
        tags.insert("#");
        assert!(tags.is_empty());
    }

    #[test]
    fn from_iterator_normalizes() {
        let tags: TagSet = ["#A", "b", "#A"].into_iter().collect();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.to_string(), "#a, #b");
    }
}
