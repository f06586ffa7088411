use anyhow::Result;

use super::load_rules;
use crate::config::Config;

/// Report every rule-file problem without evaluating anything.
pub async fn execute(config: &Config) -> Result<i32> {
    let parsed = load_rules(config).await?;

    for warning in &parsed.warnings {
        println!("{warning}");
    }

    let disabled = parsed.entries.iter().filter(|e| !e.rule.enabled).count();
    println!(
        "{} active rule(s), {} disabled, {} line(s) skipped",
        parsed.active.len(),
        disabled,
        parsed.warnings.len()
    );

    Ok(if parsed.warnings.is_empty() { 0 } else { 1 })
}
