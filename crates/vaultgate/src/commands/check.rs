use anyhow::Result;

use acl_engine::Method;

use super::Gate;
use crate::config::Config;

/// Evaluate a single path and print the verdict on stdout.
pub async fn execute(config: &Config, path: &str, method: Method) -> Result<i32> {
    let gate = Gate::open(config).await?;

    let decision = gate.engine.evaluate(path, method).await;
    let verdict = if decision.allowed { "ALLOW" } else { "DENY" };
    println!("{verdict} {method} {path}: {}", decision.reason);

    gate.log_decision(path, method, &decision).await;
    gate.close().await;

    Ok(if decision.allowed { 0 } else { 2 })
}
