//! Subcommand implementations. Each `execute` returns the process exit code.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use acl_engine::{
    parse_rules, Decision, Method, ParsedRules, PolicyEngine, PolicySnapshot,
};
use decision_log::{DecisionRecord, EventKind, EventSource, LogEntry, LogSink};
use vault_fs::FsVault;

use crate::config::Config;

pub mod check;
pub mod filter;
pub mod lint;
pub mod rules;

const COMPONENT: &str = "vaultgate";

/// Read and parse the configured rules file.
pub(crate) async fn load_rules(config: &Config) -> Result<ParsedRules> {
    let path = &config.policy.rules_file;
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    Ok(parse_rules(&text))
}

/// Everything a decision-making command needs: the engine wired to the
/// filesystem vault, and the decision log.
pub(crate) struct Gate {
    pub engine: PolicyEngine,
    sink: LogSink,
    handle: JoinHandle<()>,
}

impl Gate {
    pub(crate) async fn open(config: &Config) -> Result<Gate> {
        let parsed = load_rules(config).await?;

        let vault = Arc::new(
            FsVault::open(&config.vault.root)
                .with_context(|| format!("failed to open vault at {}", config.vault.root.display()))?,
        );

        let snapshot = PolicySnapshot::new(
            parsed.active,
            config.policy.default_policy,
            config.policy.global_tags(),
        );
        let rules = snapshot.rule_count();
        let engine = PolicyEngine::new(vault.clone(), vault, snapshot);

        let (sink, handle) = LogSink::start(&config.logging.decision_log)
            .await
            .context("failed to open decision log")?;

        info!(
            rules,
            warnings = parsed.warnings.len(),
            rules_file = %config.policy.rules_file.display(),
            vault = %config.vault.root.display(),
            "gate ready"
        );
        sink.log(LogEntry::new(
            EventKind::EngineStarted,
            EventSource::new(COMPONENT),
            serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "vault": config.vault.root.display().to_string(),
            }),
        ))
        .await;
        sink.log(LogEntry::new(
            EventKind::RulesLoaded,
            EventSource::new(COMPONENT),
            serde_json::json!({
                "rules_file": config.policy.rules_file.display().to_string(),
                "rules": rules,
                "warnings": parsed.warnings.len(),
            }),
        ))
        .await;

        Ok(Gate { engine, sink, handle })
    }

    pub(crate) async fn log_decision(&self, path: &str, method: Method, decision: &Decision) {
        let event = if decision.allowed {
            EventKind::AccessAllowed
        } else {
            EventKind::AccessDenied
        };
        let entry = LogEntry::new(
            event,
            EventSource::for_path(COMPONENT, path, method.as_str()),
            serde_json::json!({}),
        )
        .with_decision(DecisionRecord {
            allowed: decision.allowed,
            matched_kind: decision.matched_kind.map(|kind| kind.to_string()),
            matched_pattern: decision.matched_pattern.clone(),
            reason: decision.reason.clone(),
        });
        self.sink.log(entry).await;
    }

    pub(crate) async fn log_filtered(&self, method: Method, total: usize, kept: usize) {
        self.sink
            .log(LogEntry::new(
                EventKind::ListingFiltered,
                EventSource::new(COMPONENT),
                serde_json::json!({
                    "method": method.as_str(),
                    "total": total,
                    "kept": kept,
                }),
            ))
            .await;
    }

    /// Shut the decision log down cleanly so buffered entries reach disk.
    pub(crate) async fn close(self) {
        drop(self.sink);
        if let Err(err) = self.handle.await {
            warn!(%err, "decision log writer did not stop cleanly");
        }
    }
}
