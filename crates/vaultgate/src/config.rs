use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use acl_engine::{GlobalTags, RuleMode};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: VaultConfig::default(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_root")]
    pub root: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: default_vault_root(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,
    /// What happens when no rule matches: `allow` or `deny`.
    #[serde(default = "default_policy_mode")]
    pub default_policy: RuleMode,
    /// Tag that always exposes a document, regardless of rules.
    #[serde(default)]
    pub global_allow_tag: Option<String>,
    /// Tag that always blocks a document, regardless of rules.
    #[serde(default)]
    pub global_deny_tag: Option<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            default_policy: default_policy_mode(),
            global_allow_tag: None,
            global_deny_tag: None,
        }
    }
}

impl PolicyConfig {
    pub fn global_tags(&self) -> GlobalTags {
        GlobalTags {
            allow_tag: self.global_allow_tag.clone(),
            deny_tag: self.global_deny_tag.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_decision_log")]
    pub decision_log: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            decision_log: default_decision_log(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_vault_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_rules_file() -> PathBuf {
    PathBuf::from("vault.rules")
}

fn default_policy_mode() -> RuleMode {
    RuleMode::Deny
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_decision_log() -> PathBuf {
    PathBuf::from("decisions.jsonl")
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load configuration from a YAML file.
///
/// A missing file is not an error: defaults are used and a warning emitted,
/// so `vaultgate` works out of the box in a fresh vault.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        warn!(path = %path.display(), "configuration file not found; using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

    let config: Config = serde_yml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fail_closed() {
        let config = Config::default();
        assert_eq!(config.policy.default_policy, RuleMode::Deny);
        assert!(!config.policy.global_tags().is_configured());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let config: Config = serde_yml::from_str(
            "policy:\n  default_policy: allow\n  global_deny_tag: \"#private\"\n",
        )
        .unwrap();
        assert_eq!(config.policy.default_policy, RuleMode::Allow);
        assert_eq!(config.policy.global_tags().deny_tag.as_deref(), Some("#private"));
        assert_eq!(config.vault.root, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_files_load_as_defaults() {
        let config = load(Path::new("/definitely/not/here.yaml")).unwrap();
        assert_eq!(config.policy.rules_file, PathBuf::from("vault.rules"));
    }

    #[test]
    fn files_on_disk_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaultgate.yaml");
        std::fs::write(&path, "vault:\n  root: /data/vault\nlogging:\n  level: debug\n").unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.vault.root, PathBuf::from("/data/vault"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn unparseable_files_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaultgate.yaml");
        std::fs::write(&path, "policy: [not a mapping\n").unwrap();
        assert!(load(&path).is_err());
    }
}
