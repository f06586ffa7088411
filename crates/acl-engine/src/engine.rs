//! The policy engine: an immutable compiled snapshot of the active rules
//! plus the fixed-order evaluation chain that runs candidates through it.
//!
//! Chain order is part of the contract: global override tags first, then
//! folder, name, tag and keyword rules, then the default policy. The first
//! stage with an opinion decides. Folder and name stages are pure path
//! checks; tag and keyword stages are the only ones that touch providers,
//! so structurally-decided candidates never pay I/O.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::decision::Decision;
use crate::matchers::{self, folder, keyword, name, tag, CompiledRule};
use crate::provider::{
    normalize_tag, ContentLookup, ContentProvider, MetadataProvider, TagLookup,
};
use crate::rule::{MatcherKind, Method, RuleMode, RuleSet};
use crate::rulefile::{self, ParseWarning};

/// Override tags that outrank every rule: a document carrying the deny tag
/// is always blocked, one carrying the allow tag is always exposed. Deny
/// wins when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTags {
    pub allow_tag: Option<String>,
    pub deny_tag: Option<String>,
}

impl GlobalTags {
    pub fn is_configured(&self) -> bool {
        self.allow_tag.is_some() || self.deny_tag.is_some()
    }

    fn normalized(self) -> Self {
        Self {
            allow_tag: self.allow_tag.as_deref().map(normalize_tag),
            deny_tag: self.deny_tag.as_deref().map(normalize_tag),
        }
    }
}

/// One path/method pair submitted for evaluation. Bulk filtering submits
/// candidates without a method; those pass every method scope.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub path: &'a str,
    pub method: Option<Method>,
}

impl<'a> Candidate<'a> {
    pub fn new(path: &'a str) -> Self {
        Self { path, method: None }
    }

    pub fn with_method(path: &'a str, method: Method) -> Self {
        Self {
            path,
            method: Some(method),
        }
    }
}

/// An immutable, fully compiled view of the policy. Reloads build a fresh
/// snapshot and swap it in whole; evaluations in flight keep the one they
/// started with.
#[derive(Debug)]
pub struct PolicySnapshot {
    folder: Vec<CompiledRule>,
    name: Vec<CompiledRule>,
    tag: Vec<CompiledRule>,
    keyword: Vec<CompiledRule>,
    default_policy: RuleMode,
    global_tags: GlobalTags,
}

impl PolicySnapshot {
    pub fn new(rules: RuleSet, default_policy: RuleMode, global_tags: GlobalTags) -> Self {
        Self {
            folder: matchers::compile_all(MatcherKind::Folder, rules.folder),
            name: matchers::compile_all(MatcherKind::Name, rules.name),
            tag: matchers::compile_all(MatcherKind::Tag, rules.tag),
            keyword: matchers::compile_all(MatcherKind::Keyword, rules.keyword),
            default_policy,
            global_tags: global_tags.normalized(),
        }
    }

    pub fn default_policy(&self) -> RuleMode {
        self.default_policy
    }

    pub fn rule_count(&self) -> usize {
        self.folder.len() + self.name.len() + self.tag.len() + self.keyword.len()
    }
}

/// Evaluates candidates against the current snapshot.
///
/// The engine is cheap to share behind an [`Arc`] and safe to use from many
/// tasks at once; only [`install`](Self::install) takes the write lock, and
/// only long enough to swap one pointer.
pub struct PolicyEngine {
    metadata: Arc<dyn MetadataProvider>,
    content: Arc<dyn ContentProvider>,
    snapshot: RwLock<Arc<PolicySnapshot>>,
}

impl PolicyEngine {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        content: Arc<dyn ContentProvider>,
        snapshot: PolicySnapshot,
    ) -> Self {
        Self {
            metadata,
            content,
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot evaluations are currently running against.
    pub async fn current(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Atomically replace the active snapshot.
    pub async fn install(&self, snapshot: PolicySnapshot) {
        let rules = snapshot.rule_count();
        *self.snapshot.write().await = Arc::new(snapshot);
        info!(rules, "policy snapshot installed");
    }

    /// Re-parse rule text and install it, keeping the current default policy
    /// and global tags. Returns the warnings for any lines that were
    /// dropped; the swap happens regardless, matching the parser's
    /// never-fail contract.
    pub async fn reload_rules(&self, text: &str) -> Vec<ParseWarning> {
        let parsed = rulefile::parse_rules(text);
        let current = self.current().await;
        let snapshot = PolicySnapshot::new(
            parsed.active,
            current.default_policy,
            current.global_tags.clone(),
        );
        self.install(snapshot).await;
        parsed.warnings
    }

    pub async fn evaluate(&self, path: &str, method: Method) -> Decision {
        self.evaluate_candidate(Candidate::with_method(path, method))
            .await
    }

    pub async fn evaluate_candidate(&self, candidate: Candidate<'_>) -> Decision {
        let snapshot = self.current().await;
        let decision = self.run_chain(&snapshot, candidate).await;
        debug!(
            path = candidate.path,
            method = ?candidate.method,
            allowed = decision.allowed,
            reason = %decision.reason,
            "candidate evaluated"
        );
        decision
    }

    async fn run_chain(&self, snapshot: &PolicySnapshot, candidate: Candidate<'_>) -> Decision {
        // Tags are fetched at most once per candidate; the first stage that
        // needs them fills the cache.
        let mut tag_cache: Option<TagLookup> = None;

        if snapshot.global_tags.is_configured() {
            self.ensure_tags(&mut tag_cache, candidate.path).await;
            match tag_cache.as_ref() {
                Some(TagLookup::Unavailable) => {
                    return Decision::deny("tag metadata unavailable");
                }
                Some(TagLookup::Found(tags)) => {
                    if let Some(deny_tag) = &snapshot.global_tags.deny_tag {
                        if tags.contains(deny_tag) {
                            return Decision::deny(format!(
                                "global deny tag '{deny_tag}' present"
                            ));
                        }
                    }
                    if let Some(allow_tag) = &snapshot.global_tags.allow_tag {
                        if tags.contains(allow_tag) {
                            return Decision::allow(format!(
                                "global allow tag '{allow_tag}' present"
                            ));
                        }
                    }
                }
                Some(TagLookup::NotFound) | None => {}
            }
        }

        // A rule hit outside the candidate's method scope ends its stage
        // without a decision; later stages still run.
        if let Some(hit) = folder::first_match(&snapshot.folder, candidate.path) {
            if hit.rule.applies_to(candidate.method) {
                return Decision::from_rule(MatcherKind::Folder, &hit.rule);
            }
        }

        if let Some(hit) = name::first_match(&snapshot.name, candidate.path) {
            if hit.rule.applies_to(candidate.method) {
                return Decision::from_rule(MatcherKind::Name, &hit.rule);
            }
        }

        if !snapshot.tag.is_empty() {
            self.ensure_tags(&mut tag_cache, candidate.path).await;
            match tag_cache.as_ref() {
                Some(TagLookup::Unavailable) => {
                    return Decision::deny("tag metadata unavailable");
                }
                Some(TagLookup::Found(tags)) => {
                    if let Some(hit) = tag::first_match(&snapshot.tag, tags) {
                        if hit.rule.applies_to(candidate.method) {
                            return Decision::from_rule(MatcherKind::Tag, &hit.rule);
                        }
                    }
                }
                Some(TagLookup::NotFound) | None => {}
            }
        }

        if !snapshot.keyword.is_empty() {
            match self.content.content(candidate.path).await {
                ContentLookup::Unreadable => {
                    return Decision::deny("content unreadable");
                }
                ContentLookup::Loaded(text) => {
                    if let Some(hit) = keyword::first_match(&snapshot.keyword, &text) {
                        if hit.rule.applies_to(candidate.method) {
                            return Decision::from_rule(MatcherKind::Keyword, &hit.rule);
                        }
                    }
                }
                ContentLookup::NotFound => {}
            }
        }

        match snapshot.default_policy {
            RuleMode::Allow => Decision::allow("no rule matched; default policy allows"),
            RuleMode::Deny => Decision::deny("no rule matched; default policy denies"),
        }
    }

    async fn ensure_tags(&self, cache: &mut Option<TagLookup>, path: &str) {
        if cache.is_none() {
            *cache = Some(self.metadata.tags(path).await);
        }
    }
}
