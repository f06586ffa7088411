//! Bulk filtering of listings and search results.

use futures_util::future;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::engine::{Candidate, PolicyEngine};
use crate::rule::Method;

/// Upper bound on evaluations in flight during one bulk filter, so a large
/// listing with content rules cannot flood the providers.
const FILTER_FAN_OUT: usize = 16;

/// JSON fields probed, in order, for the vault path a record refers to.
const RECORD_PATH_FIELDS: [&str; 2] = ["path", "filename"];

impl PolicyEngine {
    /// Keep only the paths the policy allows for `method`, preserving input
    /// order. Evaluations run concurrently up to a fixed fan-out.
    pub async fn filter_paths(&self, paths: Vec<String>, method: Method) -> Vec<String> {
        let limiter = Semaphore::new(FILTER_FAN_OUT);
        let verdicts = future::join_all(paths.iter().map(|path| {
            let limiter = &limiter;
            async move {
                let _permit = limiter.acquire().await.expect("filter semaphore closed");
                self.evaluate(path, method).await.allowed
            }
        }))
        .await;

        let total = paths.len();
        let kept: Vec<String> = paths
            .into_iter()
            .zip(verdicts)
            .filter_map(|(path, allowed)| allowed.then_some(path))
            .collect();
        debug!(total, kept = kept.len(), %method, "filtered path listing");
        kept
    }

    /// Keep only the records whose path field the policy allows, preserving
    /// input order. Records without a recognizable path field carry nothing
    /// to check and pass through.
    pub async fn filter_records(&self, records: Vec<Value>, method: Method) -> Vec<Value> {
        let limiter = Semaphore::new(FILTER_FAN_OUT);
        let verdicts = future::join_all(records.iter().map(|record| {
            let limiter = &limiter;
            async move {
                match record_path(record) {
                    Some(path) => {
                        let _permit = limiter.acquire().await.expect("filter semaphore closed");
                        self.evaluate_candidate(Candidate::with_method(path, method))
                            .await
                            .allowed
                    }
                    None => true,
                }
            }
        }))
        .await;

        let total = records.len();
        let kept: Vec<Value> = records
            .into_iter()
            .zip(verdicts)
            .filter_map(|(record, keep)| keep.then_some(record))
            .collect();
        debug!(total, kept = kept.len(), %method, "filtered record listing");
        kept
    }
}

fn record_path(record: &Value) -> Option<&str> {
    RECORD_PATH_FIELDS
        .iter()
        .find_map(|field| record.get(field).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::engine::{GlobalTags, PolicySnapshot};
    use crate::rule::RuleMode;
    use crate::rulefile::parse_rules;
    use crate::testing::MemoryVault;

    fn engine(vault: MemoryVault, rules: &str, default_policy: RuleMode) -> PolicyEngine {
        let parsed = parse_rules(rules);
        assert!(parsed.warnings.is_empty());
        let vault = Arc::new(vault);
        PolicyEngine::new(
            vault.clone(),
            vault,
            PolicySnapshot::new(parsed.active, default_policy, GlobalTags::default()),
        )
    }

    fn paths(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn keeps_allowed_paths_in_input_order() {
        let vault = MemoryVault::new();
        let engine = engine(vault, "allow folder Public/**\n", RuleMode::Deny);
        let kept = engine
            .filter_paths(
                paths(&["Public/b.md", "Private/x.md", "Public/a.md"]),
                Method::Get,
            )
            .await;
        assert_eq!(kept, paths(&["Public/b.md", "Public/a.md"]));
    }

    #[tokio::test]
    async fn filters_large_listings_with_io_backed_rules() {
        let mut vault = MemoryVault::new();
        for i in 0..100 {
            let path = format!("notes/{i}.md");
            let body = if i % 10 == 0 { "secret stuff" } else { "plain" };
            vault = vault.with_doc(&path, body);
        }
        let engine = engine(vault, "deny keyword secret\n", RuleMode::Allow);

        let input: Vec<String> = (0..100).map(|i| format!("notes/{i}.md")).collect();
        let kept = engine.filter_paths(input.clone(), Method::Get).await;

        assert_eq!(kept.len(), 90);
        // Order is still the input order.
        let expected: Vec<String> = input.into_iter().filter(|p| {
            let n: usize = p["notes/".len()..p.len() - 3].parse().unwrap();
            n % 10 != 0
        })
        .collect();
        assert_eq!(kept, expected);
    }

    #[tokio::test]
    async fn method_applies_to_every_path_in_the_batch() {
        let vault = MemoryVault::new();
        let engine = engine(vault, "allow folder Shared/** GET\n", RuleMode::Deny);
        let input = paths(&["Shared/a.md", "Shared/b.md"]);
        assert_eq!(engine.filter_paths(input.clone(), Method::Get).await.len(), 2);
        assert!(engine.filter_paths(input, Method::Put).await.is_empty());
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let vault = MemoryVault::new();
        let engine = engine(vault, "allow folder Public/**\n", RuleMode::Deny);
        assert!(engine.filter_paths(Vec::new(), Method::Get).await.is_empty());
    }

    #[tokio::test]
    async fn records_are_filtered_by_their_path_field() {
        let vault = MemoryVault::new();
        let engine = engine(vault, "deny folder Private/**\n", RuleMode::Allow);
        let records = vec![
            json!({"path": "Public/a.md", "score": 0.9}),
            json!({"path": "Private/b.md", "score": 0.8}),
            json!({"filename": "Private/c.md"}),
            json!({"title": "no path at all"}),
        ];
        let kept = engine.filter_records(records, Method::Get).await;
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0]["path"], "Public/a.md");
        assert_eq!(kept[1]["title"], "no path at all");
    }

    #[tokio::test]
    async fn path_field_outranks_filename() {
        let vault = MemoryVault::new();
        let engine = engine(vault, "deny folder Private/**\n", RuleMode::Allow);
        let records = vec![json!({"path": "Public/a.md", "filename": "Private/a.md"})];
        let kept = engine.filter_records(records, Method::Get).await;
        assert_eq!(kept.len(), 1);
    }

    #[tokio::test]
    async fn non_object_records_pass_through() {
        let vault = MemoryVault::new();
        let engine = engine(vault, "deny folder Private/**\n", RuleMode::Allow);
        let records = vec![json!("just a string"), json!(42)];
        assert_eq!(engine.filter_records(records, Method::Get).await.len(), 2);
    }
}
