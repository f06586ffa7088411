//! Folder matching: patterns against the full vault-relative path.

use super::{path_text_matches, CompiledRule};

/// First rule whose pattern matches the path, in file order.
pub fn first_match<'r>(rules: &'r [CompiledRule], path: &str) -> Option<&'r CompiledRule> {
    rules
        .iter()
        .find(|rule| path_text_matches(rule.pattern(), path))
}
