//! Line-oriented rule-file parsing and serialization.
//!
//! Each non-empty, non-comment line declares one rule:
//!
//! ```text
//! [#!disabled ]MODE KIND PATTERN [METHODS]
//! ```
//!
//! `MODE` is `allow` or `deny`, `KIND` is `folder`, `name`, `tag` or
//! `keyword`, `PATTERN` is a bare token or a double-quoted string with
//! `\"` and `\\` escapes, and `METHODS` is an optional comma-separated
//! method list. A `~` prefix marks the pattern as a regex, optionally with
//! trailing `/flags`. Lines starting with `#` are comments, except the
//! literal `#!disabled ` marker, which keeps the rule in the file (and in
//! round-trips) but out of the active set.
//!
//! Parsing never fails as a whole: malformed lines are skipped and reported
//! as [`ParseWarning`]s so one typo cannot take the vault offline.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::rule::{MatcherKind, Method, Rule, RuleEntry, RuleMode, RuleSet};

/// Marker that keeps a rule line inert without deleting it.
const DISABLED_MARKER: &str = "#!disabled";

/// Why a particular line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineIssue {
    #[error("expected `MODE KIND PATTERN [METHODS]`, found {found} field(s)")]
    TooFewFields { found: usize },
    #[error("unknown mode '{0}' (expected allow or deny)")]
    UnknownMode(String),
    #[error("unknown matcher kind '{0}' (expected folder, name, tag or keyword)")]
    UnknownKind(String),
    #[error("unterminated quoted pattern")]
    UnterminatedQuote,
}

/// A skipped line, with its zero-based position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub issue: LineIssue,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // One-based for humans; `line` itself stays aligned with
        // `Rule::source_line`.
        write!(f, "line {}: {}", self.line + 1, self.issue)
    }
}

/// Everything a parse produces: the active rules grouped for evaluation,
/// every entry (disabled ones included) in file order for round-tripping,
/// and the warnings for lines that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedRules {
    pub active: RuleSet,
    pub entries: Vec<RuleEntry>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse a whole rule file. Infallible by design; see the module docs.
pub fn parse_rules(text: &str) -> ParsedRules {
    let mut parsed = ParsedRules::default();
    for (line_no, raw) in text.lines().enumerate() {
        match parse_line(raw, line_no) {
            LineOutcome::Skip => {}
            LineOutcome::Invalid(issue) => {
                warn!(line = line_no + 1, issue = %issue, "skipping malformed rule line");
                parsed.warnings.push(ParseWarning { line: line_no, issue });
            }
            LineOutcome::Entry(entry) => {
                if entry.rule.enabled {
                    parsed.active.push(entry.kind, entry.rule.clone());
                }
                parsed.entries.push(entry);
            }
        }
    }
    parsed
}

/// Render one rule as a line that [`parse_rules`] reads back identically.
pub fn serialize_rule(kind: MatcherKind, rule: &Rule) -> String {
    let mut line = String::new();
    if !rule.enabled {
        line.push_str(DISABLED_MARKER);
        line.push(' ');
    }
    line.push_str(rule.mode.as_str());
    line.push(' ');
    line.push_str(kind.as_str());
    line.push(' ');
    line.push_str(&pattern_token(rule));
    if let Some(methods) = &rule.methods {
        if !methods.is_empty() {
            line.push(' ');
            let joined: Vec<&str> = methods.iter().map(|m| m.as_str()).collect();
            line.push_str(&joined.join(","));
        }
    }
    line
}

/// The pattern field as it appears on a serialized line: regex prefix and
/// flags re-attached, quoted whenever a bare token would not read back.
fn pattern_token(rule: &Rule) -> String {
    let token = if rule.is_regex {
        match rule.regex_flags.as_deref() {
            Some(flags) => format!("~{}/{}", rule.pattern, flags),
            None => format!("~{}", rule.pattern),
        }
    } else {
        rule.pattern.clone()
    };
    let needs_quotes =
        token.is_empty() || token.starts_with('"') || token.chars().any(char::is_whitespace);
    if needs_quotes {
        quote_pattern(&token)
    } else {
        token
    }
}

fn quote_pattern(token: &str) -> String {
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for ch in token.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Render a full entry list back into file text, one line per entry.
pub fn serialize_rules(entries: &[RuleEntry]) -> String {
    let mut text = String::new();
    for entry in entries {
        text.push_str(&serialize_rule(entry.kind, &entry.rule));
        text.push('\n');
    }
    text
}

enum LineOutcome {
    Skip,
    Invalid(LineIssue),
    Entry(RuleEntry),
}

fn parse_line(raw: &str, line_no: usize) -> LineOutcome {
    let line = raw.trim();
    if line.is_empty() {
        return LineOutcome::Skip;
    }

    // The disabled marker must be followed by whitespace; any other line
    // starting with `#` is a comment.
    let (enabled, body) = match line.strip_prefix(DISABLED_MARKER) {
        Some(rest) if rest.starts_with(char::is_whitespace) => (false, rest.trim_start()),
        Some(_) => return LineOutcome::Skip,
        None if line.starts_with('#') => return LineOutcome::Skip,
        None => (true, line),
    };

    let Some((mode_token, rest)) = take_token(body) else {
        return LineOutcome::Invalid(LineIssue::TooFewFields { found: 0 });
    };
    let Some((kind_token, rest)) = take_token(rest) else {
        return LineOutcome::Invalid(LineIssue::TooFewFields { found: 1 });
    };

    let Some(mode) = RuleMode::parse_token(mode_token) else {
        return LineOutcome::Invalid(LineIssue::UnknownMode(mode_token.to_string()));
    };
    let Some(kind) = MatcherKind::parse_token(kind_token) else {
        return LineOutcome::Invalid(LineIssue::UnknownKind(kind_token.to_string()));
    };

    let (pattern_field, rest) = match take_pattern(rest) {
        Ok(Some(taken)) => taken,
        Ok(None) => return LineOutcome::Invalid(LineIssue::TooFewFields { found: 2 }),
        Err(issue) => return LineOutcome::Invalid(issue),
    };

    let (pattern, is_regex, regex_flags) = split_regex(pattern_field);
    let methods = parse_methods(rest);

    LineOutcome::Entry(RuleEntry {
        kind,
        rule: Rule {
            mode,
            pattern,
            is_regex,
            regex_flags,
            methods,
            enabled,
            source_line: line_no,
        },
    })
}

/// Split one whitespace-delimited token off the front of `input`.
fn take_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], input[end..].trim_start())),
        None => Some((input, "")),
    }
}

/// Take the pattern field: either a bare token or a double-quoted string.
/// Inside quotes, `\"` is a literal quote and `\\` a literal backslash;
/// any other backslash sequence is kept verbatim so glob escapes survive.
fn take_pattern(input: &str) -> Result<Option<(String, &str)>, LineIssue> {
    let input = input.trim_start();
    if input.is_empty() {
        return Ok(None);
    }
    let Some(quoted) = input.strip_prefix('"') else {
        return Ok(take_token(input).map(|(token, rest)| (token.to_string(), rest)));
    };

    let mut pattern = String::new();
    let mut chars = quoted.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, '"')) => pattern.push('"'),
                Some((_, '\\')) => pattern.push('\\'),
                Some((_, other)) => {
                    pattern.push('\\');
                    pattern.push(other);
                }
                None => return Err(LineIssue::UnterminatedQuote),
            },
            '"' => {
                let rest = quoted[idx + 1..].trim_start();
                return Ok(Some((pattern, rest)));
            }
            other => pattern.push(other),
        }
    }
    Err(LineIssue::UnterminatedQuote)
}

/// Strip the `~` regex prefix and a trailing `/flags` suffix. Flags must be
/// at least one ASCII letter; otherwise the `/` is part of the pattern.
fn split_regex(token: String) -> (String, bool, Option<String>) {
    let Some(stripped) = token.strip_prefix('~') else {
        return (token, false, None);
    };
    if let Some(slash) = stripped.rfind('/') {
        let flags = &stripped[slash + 1..];
        if !flags.is_empty() && flags.chars().all(|c| c.is_ascii_alphabetic()) {
            return (
                stripped[..slash].to_string(),
                true,
                Some(flags.to_string()),
            );
        }
    }
    (stripped.to_string(), true, None)
}

/// Read the optional method list. Unknown tokens are dropped; an empty
/// result means the rule is unscoped. Anything after the list is ignored.
fn parse_methods(rest: &str) -> Option<BTreeSet<Method>> {
    let (token, _trailing) = take_token(rest)?;
    let methods: BTreeSet<Method> = token.split(',').filter_map(Method::parse_token).collect();
    if methods.is_empty() {
        None
    } else {
        Some(methods)
    }
}
