//! Diagnostics for every linkwatch command.
//!
//! Command output and diagnostics never share a stream. `notify` prints
//! `event: <name>` lines and the diff commands print patch blocks on stdout,
//! so those can be piped or captured. Everything logged through `tracing` goes
//! to stderr with a `HH:MM:SS.mmm` stamp and a `[component]` tag:
//!
//! ```text
//! 14:02:07.311  INFO [notify] watching: /srv/app for 'current'
//! 14:02:09.020 DEBUG [reader] read: 32 bytes
//! ```
//!
//! Levels come from `[logging]` in `settings.toml` (quiet `warn` by default,
//! `--verbose` raises it to `debug`). A non-empty `RUST_LOG` replaces the
//! configured directives entirely.

use std::sync::Once;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Wall-clock stamp without the date.
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// `default,module=level,...` directives for the configured levels.
pub fn filter_directives(config: &LoggingConfig) -> String {
    config
        .modules
        .iter()
        .fold(config.default.clone(), |mut directives, (module, level)| {
            directives.push(',');
            directives.push_str(module);
            directives.push('=');
            directives.push_str(level);
            directives
        })
}

/// Directives to install: `rust_log` when set and non-empty, otherwise the
/// configured levels.
fn select_directives(config: &LoggingConfig, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => filter_directives(config),
    }
}

/// Install the stderr subscriber. Only the first call has an effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = EnvFilter::new(select_directives(config, rust_log.as_deref()));

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(ClockTime)
            .with_filter(filter);

        tracing_subscriber::registry().with(stderr_layer).init();
    });
}

/// Info-level event tagged with the component that emitted it.
///
/// ```ignore
/// log_event!("http", "good");
/// log_event!("notify", "watching", "{}", dir.display());
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        ::tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        ::tracing::info!("[{}] {}: {}", $component, $event, format_args!($($arg)*))
    };
}

/// Debug-level counterpart of [`log_event!`].
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        ::tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        ::tracing::debug!("[{}] {}: {}", $component, $event, format_args!($($arg)*))
    };
}
