//! Pattern compilation and the per-kind matching primitives.
//!
//! Rules are compiled once when a snapshot is built so that evaluation never
//! pays parse or compile cost. A pattern that fails to compile degrades to
//! [`CompiledPattern::Never`]: the rule stays in the set, is reported via a
//! warning log, and simply never matches.

use globset::GlobBuilder;
use regex::RegexBuilder;
use tracing::warn;

use crate::provider::normalize_tag;
use crate::rule::{MatcherKind, Rule};

pub mod folder;
pub mod keyword;
pub mod name;
pub mod tag;

/// A rule pattern in its ready-to-match form.
#[derive(Debug)]
pub enum CompiledPattern {
    /// Glob over path text. `*` does not cross `/`; `**` does.
    Glob(globset::GlobMatcher),
    /// Regular expression, applied to whatever text the kind matches on.
    Regex(regex::Regex),
    /// Literal substring searched in document content.
    Substring(String),
    /// Normalized tags that must all be present (`a+b` syntax).
    AllTags(Vec<String>),
    /// Pattern failed to compile; matches nothing.
    Never,
}

/// One active rule with its pattern pre-compiled.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: Rule,
    pattern: CompiledPattern,
}

impl CompiledRule {
    pub fn compile(kind: MatcherKind, rule: Rule) -> Self {
        let pattern = compile_pattern(kind, &rule);
        Self { rule, pattern }
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

pub fn compile_all(kind: MatcherKind, rules: Vec<Rule>) -> Vec<CompiledRule> {
    rules
        .into_iter()
        .map(|rule| CompiledRule::compile(kind, rule))
        .collect()
}

fn compile_pattern(kind: MatcherKind, rule: &Rule) -> CompiledPattern {
    if rule.is_regex {
        return match RegexBuilder::new(&rule.pattern)
            .case_insensitive(rule.case_insensitive())
            .build()
        {
            Ok(regex) => CompiledPattern::Regex(regex),
            Err(err) => {
                warn!(
                    pattern = %rule.pattern,
                    line = rule.source_line,
                    error = %err,
                    "invalid regex in rule, it will never match"
                );
                CompiledPattern::Never
            }
        };
    }

    match kind {
        MatcherKind::Folder | MatcherKind::Name => {
            match GlobBuilder::new(&rule.pattern).literal_separator(true).build() {
                Ok(glob) => CompiledPattern::Glob(glob.compile_matcher()),
                Err(err) => {
                    warn!(
                        pattern = %rule.pattern,
                        line = rule.source_line,
                        error = %err,
                        "invalid glob in rule, it will never match"
                    );
                    CompiledPattern::Never
                }
            }
        }
        MatcherKind::Tag => {
            let tags: Vec<String> = rule
                .pattern
                .split('+')
                .map(normalize_tag)
                .filter(|tag| tag.len() > 1)
                .collect();
            if tags.is_empty() {
                warn!(
                    pattern = %rule.pattern,
                    line = rule.source_line,
                    "tag rule has no usable tags, it will never match"
                );
                CompiledPattern::Never
            } else {
                CompiledPattern::AllTags(tags)
            }
        }
        MatcherKind::Keyword => CompiledPattern::Substring(rule.pattern.clone()),
    }
}

/// Glob-or-regex check against a piece of path text. Shared by the folder
/// and name matchers, which differ only in what text they hand in.
pub(crate) fn path_text_matches(pattern: &CompiledPattern, text: &str) -> bool {
    match pattern {
        CompiledPattern::Glob(glob) => glob.is_match(text),
        CompiledPattern::Regex(regex) => regex.is_match(text),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleMode;

    fn compiled(kind: MatcherKind, pattern: &str) -> CompiledRule {
        CompiledRule::compile(kind, Rule::new(RuleMode::Deny, pattern))
    }

    #[test]
    fn folder_patterns_compile_to_globs() {
        let rule = compiled(MatcherKind::Folder, "Private/**");
        assert!(matches!(rule.pattern(), CompiledPattern::Glob(_)));
    }

    #[test]
    fn keyword_patterns_stay_literal() {
        let rule = compiled(MatcherKind::Keyword, "CONFIDENTIAL");
        assert!(matches!(rule.pattern(), CompiledPattern::Substring(_)));
    }

    #[test]
    fn tag_patterns_split_and_normalize() {
        let rule = compiled(MatcherKind::Tag, "#Secret+Work");
        match rule.pattern() {
            CompiledPattern::AllTags(tags) => {
                assert_eq!(tags, &["#secret".to_string(), "#work".to_string()]);
            }
            other => panic!("expected AllTags, got {other:?}"),
        }
    }

    #[test]
    fn regex_rules_compile_for_any_kind() {
        let mut rule = Rule::new(RuleMode::Deny, "^Private/");
        rule.is_regex = true;
        let compiled = CompiledRule::compile(MatcherKind::Folder, rule);
        assert!(matches!(compiled.pattern(), CompiledPattern::Regex(_)));
    }

    #[test]
    fn invalid_regex_degrades_to_never() {
        let mut rule = Rule::new(RuleMode::Deny, "([unclosed");
        rule.is_regex = true;
        let compiled = CompiledRule::compile(MatcherKind::Keyword, rule);
        assert!(matches!(compiled.pattern(), CompiledPattern::Never));
    }

    #[test]
    fn tag_rule_without_usable_tags_degrades_to_never() {
        let rule = compiled(MatcherKind::Tag, "+++");
        assert!(matches!(rule.pattern(), CompiledPattern::Never));
    }

    #[test]
    fn case_insensitive_regex_honors_the_flag() {
        let mut rule = Rule::new(RuleMode::Deny, "secret");
        rule.is_regex = true;
        rule.regex_flags = Some("i".to_string());
        let compiled = CompiledRule::compile(MatcherKind::Keyword, rule);
        match compiled.pattern() {
            CompiledPattern::Regex(regex) => assert!(regex.is_match("SECRET plans")),
            other => panic!("expected Regex, got {other:?}"),
        }
    }
}
