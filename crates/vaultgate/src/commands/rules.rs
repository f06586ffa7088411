use anyhow::Result;

use acl_engine::serialize_rules;

use super::load_rules;
use crate::config::Config;

/// Print the rule file in canonical form: normalized casing and spacing,
/// same rules in the same order, disabled entries still marked.
pub async fn execute(config: &Config) -> Result<i32> {
    let parsed = load_rules(config).await?;
    print!("{}", serialize_rules(&parsed.entries));
    Ok(0)
}
