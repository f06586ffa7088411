//! Name matching: patterns against the final path segment only.

use super::{path_text_matches, CompiledRule};

/// The final segment of a vault-relative path.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// First rule whose pattern matches the path's basename, in file order.
pub fn first_match<'r>(rules: &'r [CompiledRule], path: &str) -> Option<&'r CompiledRule> {
    let name = basename(path);
    rules
        .iter()
        .find(|rule| path_text_matches(rule.pattern(), name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::CompiledRule;
    use crate::rule::{MatcherKind, Rule, RuleMode};

    fn rules(patterns: &[&str]) -> Vec<CompiledRule> {
        patterns
            .iter()
            .map(|p| CompiledRule::compile(MatcherKind::Name, Rule::new(RuleMode::Deny, *p)))
            .collect()
    }

    #[test]
    fn basename_strips_the_directory_part() {
        assert_eq!(basename("a/b/c.md"), "c.md");
        assert_eq!(basename("c.md"), "c.md");
        assert_eq!(basename("a/b/"), "");
    }

    #[test]
    fn matches_the_basename_regardless_of_folder() {
        let rules = rules(&["*.draft.md"]);
        assert!(first_match(&rules, "notes.draft.md").is_some());
        assert!(first_match(&rules, "deep/nested/notes.draft.md").is_some());
        assert!(first_match(&rules, "notes.md").is_none());
    }

    #[test]
    fn ignores_directory_names_entirely() {
        let rules = rules(&["secret*"]);
        assert!(first_match(&rules, "secret-plan.md").is_some());
        assert!(first_match(&rules, "secrets/public.md").is_none());
    }

    #[test]
    fn regex_name_rules_see_only_the_basename() {
        let mut rule = Rule::new(RuleMode::Deny, "^\\d{4}-\\d{2}-\\d{2}");
        rule.is_regex = true;
        let rules = vec![CompiledRule::compile(MatcherKind::Name, rule)];
        assert!(first_match(&rules, "Journal/2024-06-01.md").is_some());
        assert!(first_match(&rules, "2024/Journal/summary.md").is_none());
    }
}
