//! Detect atomic symlink swaps with inotify.
//!
//! The core is [`watcher::notify`]: watch the directory containing a symlink and
//! call a handler whenever a new entry is renamed onto the symlink's name.
//! Alongside it live the redirect test server ([`http_server`]) and the JSON
//! snapshot differ ([`diff`]) used when testing rollouts.

pub mod cli;
pub mod config;
pub mod diff;
#[cfg(feature = "http-server")]
pub mod http_server;
pub mod logging;
pub mod watcher;

pub use config::Settings;
pub use watcher::{Event, EventMask, Notifier, NotifyError, Stopped, Target, notify};
