use serde::{Deserialize, Serialize};

/// One recorded event: an access decision, a bulk filter run, or an
/// engine lifecycle moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event: EventKind,
    pub source: EventSource,
    /// Free-form event payload (rule counts, filter totals, ...).
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionRecord>,
}

impl LogEntry {
    /// New entry with a fresh id and the current UTC timestamp.
    pub fn new(event: EventKind, source: EventSource, details: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            event,
            source,
            details,
            decision: None,
        }
    }

    pub fn with_decision(mut self, decision: DecisionRecord) -> Self {
        self.decision = Some(decision);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EngineStarted,
    RulesLoaded,
    AccessAllowed,
    AccessDenied,
    ListingFiltered,
}

/// Where an event came from: the component name plus, for access events,
/// the path and method under evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSource {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl EventSource {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            path: None,
            method: None,
        }
    }

    pub fn for_path(
        component: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            path: Some(path.into()),
            method: Some(method.into()),
        }
    }
}

/// Structured outcome of a policy evaluation, attached to access events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_serialize_without_empty_optionals() {
        let entry = LogEntry::new(
            EventKind::RulesLoaded,
            EventSource::new("vaultgate"),
            serde_json::json!({"rules": 4}),
        );
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"rules_loaded\""));
        assert!(!json.contains("\"decision\""));
        assert!(!json.contains("\"path\""));
    }

    #[test]
    fn access_entries_carry_the_decision() {
        let entry = LogEntry::new(
            EventKind::AccessDenied,
            EventSource::for_path("vaultgate", "Private/a.md", "GET"),
            serde_json::json!({}),
        )
        .with_decision(DecisionRecord {
            allowed: false,
            matched_kind: Some("folder".to_string()),
            matched_pattern: Some("Private/**".to_string()),
            reason: "folder rule 'Private/**' matched (deny)".to_string(),
        });

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"access_denied\""));
        assert!(json.contains("\"Private/**\""));

        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event, EventKind::AccessDenied);
        assert!(!back.decision.unwrap().allowed);
    }
}
