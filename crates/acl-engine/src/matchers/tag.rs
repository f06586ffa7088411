//! Tag matching: patterns against the candidate's normalized tag set.

use super::{CompiledPattern, CompiledRule};
use crate::provider::TagSet;

/// First rule satisfied by the tag set, in file order.
///
/// An `AllTags` pattern requires every listed tag to be present. A regex
/// pattern matches if any single tag matches it.
pub fn first_match<'r>(rules: &'r [CompiledRule], tags: &TagSet) -> Option<&'r CompiledRule> {
    rules.iter().find(|rule| tags_match(rule, tags))
}

fn tags_match(rule: &CompiledRule, tags: &TagSet) -> bool {
    match rule.pattern() {
        CompiledPattern::AllTags(required) => required.iter().all(|tag| tags.contains(tag)),
        CompiledPattern::Regex(regex) => tags.iter().any(|tag| regex.is_match(tag)),
        _ => false,
    }
}
