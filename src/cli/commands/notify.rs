//! Notify command - report symlink swaps.

use std::path::PathBuf;

use anyhow::Context;

use crate::config::Settings;
use crate::watcher::{Event, Notifier, Stopped};

/// Run the notify command until the watch ends or Ctrl-C is pressed.
///
/// `target` and `buffer_capacity` override `notify.target` and
/// `notify.buffer_capacity`.
pub async fn run(
    target: Option<PathBuf>,
    buffer_capacity: Option<usize>,
    config: &Settings,
) -> anyhow::Result<()> {
    let target = target
        .or_else(|| config.notify.target.clone())
        .context("no target given: pass a path or set notify.target")?;
    let capacity = buffer_capacity.unwrap_or(config.notify.buffer_capacity);

    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = cancel_tx.send(());
            }
            Err(e) => {
                // Keep the sender alive so the watch is not cancelled by the drop.
                tracing::warn!("[notify] cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        }
    });

    let notifier = Notifier::new(&target)?
        .buffer_capacity(capacity)
        .cancel_on(cancel_rx);

    let stopped = tokio::task::spawn_blocking(move || notifier.run(print_event))
        .await?
        .with_context(|| format!("watching {}", target.display()))?;

    match stopped {
        Stopped::EndOfStream => crate::log_event!("notify", "stopped", "end of stream"),
        Stopped::Cancelled => crate::log_event!("notify", "stopped", "interrupted"),
    }
    Ok(())
}

fn print_event(event: Event) {
    println!("event: {}", event.name);
    crate::log_event!(
        "notify",
        "moved in",
        "{} (mask {:#x}, cookie {})",
        event.name,
        event.mask.bits(),
        event.cookie
    );
}
