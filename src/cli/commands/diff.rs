//! JSON diff commands.

use std::io;

use crate::config::Settings;
use crate::diff::{diff_reader, follow_watch};

/// Diff JSON documents from stdin until EOF.
pub async fn run_json_diff() -> anyhow::Result<()> {
    let count = tokio::task::spawn_blocking(|| {
        let stdin = io::stdin();
        let mut out = io::stdout().lock();
        diff_reader(stdin.lock(), &mut out)
    })
    .await??;

    crate::debug_event!("diff", "done", "{count} snapshots");
    Ok(())
}

/// Follow a watch endpoint. `no_reconnect` overrides `diff.reconnect`.
pub async fn run_watch_diff(
    url: &str,
    no_reconnect: bool,
    config: &Settings,
) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let reconnect = config.diff.reconnect && !no_reconnect;

    let mut out = io::stdout();
    follow_watch(&client, url, reconnect, &mut out).await?;
    Ok(())
}
