//! Keyword matching: patterns against the candidate's text content.

use super::{CompiledPattern, CompiledRule};

/// First rule found in the content, in file order.
///
/// Literal patterns are case-sensitive substring searches; regex patterns
/// control their own case handling via flags.
pub fn first_match<'r>(rules: &'r [CompiledRule], content: &str) -> Option<&'r CompiledRule> {
    rules.iter().find(|rule| content_matches(rule, content))
}

fn content_matches(rule: &CompiledRule, content: &str) -> bool {
    match rule.pattern() {
        CompiledPattern::Substring(needle) => content.contains(needle.as_str()),
        CompiledPattern::Regex(regex) => regex.is_match(content),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::CompiledRule;
    use crate::rule::{MatcherKind, Rule, RuleMode};

    fn literal(pattern: &str) -> Vec<CompiledRule> {
        vec![CompiledRule::compile(
            MatcherKind::Keyword,
            Rule::new(RuleMode::Deny, pattern),
        )]
    }

    #[test]
    fn literal_search_is_case_sensitive() {
        let rules = literal("CONFIDENTIAL");
        assert!(first_match(&rules, "This is CONFIDENTIAL material").is_some());
        assert!(first_match(&rules, "this is confidential material").is_none());
    }

    #[test]
    fn literal_search_matches_inside_words() {
        let rules = literal("secret");
        assert!(first_match(&rules, "top-secretive plans").is_some());
    }

    #[test]
    fn regex_with_i_flag_ignores_case() {
        let mut rule = Rule::new(RuleMode::Deny, "api[_-]key");
        rule.is_regex = true;
        rule.regex_flags = Some("i".to_string());
        let rules = vec![CompiledRule::compile(MatcherKind::Keyword, rule)];
        assert!(first_match(&rules, "API_KEY=abc123").is_some());
        assert!(first_match(&rules, "api-key: abc123").is_some());
        assert!(first_match(&rules, "public token").is_none());
    }

    #[test]
    fn empty_content_matches_nothing() {
        let rules = literal("secret");
        assert!(first_match(&rules, "").is_none());
    }
}
