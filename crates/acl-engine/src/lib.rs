//! # acl-engine
//!
//! Rule-based access control for a document vault. The engine decides, per
//! path and request method, whether a caller may see or touch a document,
//! and can filter whole listings down to the visible subset.
//!
//! Rules come from a line-oriented rule file ([`rulefile`]), are grouped by
//! what they match on (folder path, file name, tags, content keywords) and
//! are evaluated in a fixed order with first-match-wins semantics inside
//! each group. Storage access goes through the async [`provider`] traits,
//! so the engine itself never touches a filesystem.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use acl_engine::testing::MemoryVault;
//! use acl_engine::{GlobalTags, Method, PolicyEngine, PolicySnapshot, RuleMode};
//!
//! # async fn demo() {
//! let vault = Arc::new(MemoryVault::new().with_doc("Public/note.md", "hello"));
//! let parsed = acl_engine::parse_rules("allow folder Public/**\n");
//! let engine = PolicyEngine::new(
//!     vault.clone(),
//!     vault,
//!     PolicySnapshot::new(parsed.active, RuleMode::Deny, GlobalTags::default()),
//! );
//!
//! let decision = engine.evaluate("Public/note.md", Method::Get).await;
//! assert!(decision.allowed);
//! # }
//! ```

pub mod decision;
pub mod engine;
mod filter;
pub mod matchers;
pub mod provider;
pub mod rule;
pub mod rulefile;
pub mod testing;

pub use decision::Decision;
pub use engine::{Candidate, GlobalTags, PolicyEngine, PolicySnapshot};
pub use provider::{ContentLookup, ContentProvider, MetadataProvider, TagLookup, TagSet};
pub use rule::{MatcherKind, Method, Rule, RuleEntry, RuleMode, RuleSet};
pub use rulefile::{parse_rules, serialize_rule, serialize_rules, ParseWarning, ParsedRules};
