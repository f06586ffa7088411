//! Tag extraction from document text.
//!
//! Tags come from two places: the YAML front-matter block (keys `tags` and
//! `tag`, as a sequence or a comma/space separated string) and inline
//! `#tag` occurrences in the body. Malformed front-matter is ignored rather
//! than failing the lookup; inline tags still count.

use acl_engine::TagSet;
use regex::Regex;
use serde_yml::Value;
use tracing::debug;

/// Inline tags: `#` at a line start or after whitespace, followed by word
/// characters, `/` or `-`. Headings (`# Title`) have a space after the `#`
/// and do not match.
pub(crate) const INLINE_TAG_PATTERN: &str = r"(?m)(?:^|\s)#([\w/-]+)";

pub(crate) fn extract_tags(inline_tag: &Regex, text: &str) -> TagSet {
    let mut tags = TagSet::new();
    if let Some(block) = frontmatter_block(text) {
        frontmatter_tags(block, &mut tags);
    }
    for captures in inline_tag.captures_iter(text) {
        if let Some(tag) = captures.get(1) {
            tags.insert(tag.as_str());
        }
    }
    tags
}

/// The YAML between the opening `---` line and the closing `---` line.
/// Front-matter must start at the very beginning of the document.
fn frontmatter_block(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}

fn frontmatter_tags(block: &str, tags: &mut TagSet) {
    let value: Value = match serde_yml::from_str(block) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "unparseable front-matter, using inline tags only");
            return;
        }
    };
    for key in ["tags", "tag"] {
        match value.get(key) {
            Some(Value::String(list)) => {
                for raw in list.split([',', ' ']) {
                    tags.insert(raw);
                }
            }
            Some(Value::Sequence(items)) => {
                for item in items {
                    if let Some(raw) = item.as_str() {
                        tags.insert(raw);
                    }
                }
            }
            _ => {}
        }
    }
}
