use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use acl_engine::Method;

use super::Gate;
use crate::config::Config;

/// Filter a newline-separated listing from stdin to stdout.
///
/// In path mode each line is a vault-relative path. In JSON mode each line
/// is one record (as in search results); lines that fail to parse are
/// skipped with a warning rather than passed through unchecked.
pub async fn execute(config: &Config, method: Method, json: bool) -> Result<i32> {
    let gate = Gate::open(config).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut paths: Vec<String> = Vec::new();
    let mut records: Vec<serde_json::Value> = Vec::new();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if json {
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(err) => warn!(line = line_no, error = %err, "skipping unparseable record"),
            }
        } else {
            paths.push(line.to_string());
        }
    }

    let (total, kept) = if json {
        let total = records.len();
        let kept = gate.engine.filter_records(records, method).await;
        for record in &kept {
            println!("{record}");
        }
        (total, kept.len())
    } else {
        let total = paths.len();
        let kept = gate.engine.filter_paths(paths, method).await;
        for path in &kept {
            println!("{path}");
        }
        (total, kept.len())
    };

    gate.log_filtered(method, total, kept).await;
    gate.close().await;

    Ok(0)
}
