//! Rule data model: what a single access rule says, independent of how it
//! was written down or how it gets matched.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// Request methods a rule may be scoped to.
///
/// `GET`/`HEAD` are reads, the rest mutate. A rule with no method list
/// applies to every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Case-insensitive lookup used by the rule-file parser. Unknown tokens
    /// yield `None` so callers can drop them without failing the whole line.
    pub fn parse_token(token: &str) -> Option<Method> {
        let token = token.trim();
        Method::ALL
            .into_iter()
            .find(|method| token.eq_ignore_ascii_case(method.as_str()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown method '{0}' (expected GET, HEAD, POST, PUT, PATCH or DELETE)")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::parse_token(s).ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Rule modes and matcher kinds
// ---------------------------------------------------------------------------

/// Whether a matching rule grants or blocks access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    Allow,
    Deny,
}

impl RuleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleMode::Allow => "allow",
            RuleMode::Deny => "deny",
        }
    }

    pub fn parse_token(token: &str) -> Option<RuleMode> {
        if token.eq_ignore_ascii_case("allow") {
            Some(RuleMode::Allow)
        } else if token.eq_ignore_ascii_case("deny") {
            Some(RuleMode::Deny)
        } else {
            None
        }
    }

    pub fn is_allow(self) -> bool {
        matches!(self, RuleMode::Allow)
    }
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which attribute of a candidate the rule's pattern is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    Folder,
    Name,
    Tag,
    Keyword,
}

impl MatcherKind {
    /// Evaluation order of the matcher kinds, cheapest first.
    pub const ORDERED: [MatcherKind; 4] = [
        MatcherKind::Folder,
        MatcherKind::Name,
        MatcherKind::Tag,
        MatcherKind::Keyword,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MatcherKind::Folder => "folder",
            MatcherKind::Name => "name",
            MatcherKind::Tag => "tag",
            MatcherKind::Keyword => "keyword",
        }
    }

    pub fn parse_token(token: &str) -> Option<MatcherKind> {
        MatcherKind::ORDERED
            .into_iter()
            .find(|kind| token.eq_ignore_ascii_case(kind.as_str()))
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One access rule as authored in the rule file.
///
/// The pattern is interpreted according to the matcher kind it is grouped
/// under: a glob for `folder` and `name`, a `+`-joined tag list for `tag`,
/// a literal substring for `keyword`. With `is_regex` set the pattern is a
/// regular expression for every kind instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub mode: RuleMode,
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
    /// Regex flag letters (`i` is the only one honored) from `~pat/flags`.
    #[serde(default)]
    pub regex_flags: Option<String>,
    /// Methods the rule is scoped to. Absent or empty means all methods.
    #[serde(default)]
    pub methods: Option<BTreeSet<Method>>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Zero-based line in the rule file this rule came from.
    #[serde(default)]
    pub source_line: usize,
}

impl Rule {
    pub fn new(mode: RuleMode, pattern: impl Into<String>) -> Self {
        Self {
            mode,
            pattern: pattern.into(),
            is_regex: false,
            regex_flags: None,
            methods: None,
            enabled: true,
            source_line: 0,
        }
    }

    /// Whether this rule is in scope for the given request method.
    ///
    /// A candidate without a method (bulk filtering of mixed listings) passes
    /// every scope, as does a rule without a method list.
    pub fn applies_to(&self, method: Option<Method>) -> bool {
        match (&self.methods, method) {
            (Some(scoped), Some(method)) if !scoped.is_empty() => scoped.contains(&method),
            _ => true,
        }
    }

    /// True when the regex flags request case-insensitive matching.
    pub fn case_insensitive(&self) -> bool {
        self.regex_flags
            .as_deref()
            .is_some_and(|flags| flags.contains('i'))
    }
}

/// A rule together with the matcher kind it was filed under. This is the
/// unit the rule-file parser produces and the serializer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub kind: MatcherKind,
    pub rule: Rule,
}

/// Active rules grouped by matcher kind, each group in file order.
///
/// File order is authoritative: within a kind the first matching rule wins,
/// so the vectors are never reordered after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub folder: Vec<Rule>,
    pub name: Vec<Rule>,
    pub tag: Vec<Rule>,
    pub keyword: Vec<Rule>,
}

impl RuleSet {
    pub fn push(&mut self, kind: MatcherKind, rule: Rule) {
        self.group_mut(kind).push(rule);
    }

    pub fn rules(&self, kind: MatcherKind) -> &[Rule] {
        match kind {
            MatcherKind::Folder => &self.folder,
            MatcherKind::Name => &self.name,
            MatcherKind::Tag => &self.tag,
            MatcherKind::Keyword => &self.keyword,
        }
    }

    fn group_mut(&mut self, kind: MatcherKind) -> &mut Vec<Rule> {
        match kind {
            MatcherKind::Folder => &mut self.folder,
            MatcherKind::Name => &mut self.name,
            MatcherKind::Tag => &mut self.tag,
            MatcherKind::Keyword => &mut self.keyword,
        }
    }

    pub fn len(&self) -> usize {
        self.folder.len() + self.name.len() + self.tag.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn default_enabled() -> bool {
    true
}
