//! The outcome of evaluating one candidate against the active policy.

use serde::{Deserialize, Serialize};

use crate::rule::{MatcherKind, Rule};

/// Verdict for a single path/method pair.
///
/// `reason` is human-readable and names the rule (or fallback) that decided;
/// the matched fields carry the same information in structured form for the
/// decision log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
    pub matched_kind: Option<MatcherKind>,
    pub matched_pattern: Option<String>,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            matched_kind: None,
            matched_pattern: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            matched_kind: None,
            matched_pattern: None,
        }
    }

    /// Decision produced by a rule hit at the given matcher stage.
    pub fn from_rule(kind: MatcherKind, rule: &Rule) -> Self {
        Self {
            allowed: rule.mode.is_allow(),
            reason: format!("{} rule '{}' matched ({})", kind, rule.pattern, rule.mode),
            matched_kind: Some(kind),
            matched_pattern: Some(rule.pattern.clone()),
        }
    }
}
