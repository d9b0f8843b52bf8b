//! Error types for the move-in watcher.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failures of a watch.
///
/// Every variant ends the dispatch loop; nothing is retried internally.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to open inotify channel: {0}")]
    ChannelOpen(#[source] io::Error),

    #[error("Cannot watch {path}: {source}")]
    WatchRegistration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read inotify events: {0}")]
    Read(#[source] io::Error),

    #[error("Short read: {remaining} trailing bytes at offset {offset} do not form a complete record")]
    ShortRecord { offset: usize, remaining: usize },

    #[error("Failed to close inotify channel: {0}")]
    Close(#[source] io::Error),

    #[error("Invalid target {path}: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },

    #[error("Failed to create wakeup pipe: {0}")]
    Wakeup(#[source] io::Error),

    #[error("Failed to start reader thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Reader thread exited without reporting why")]
    ReaderExited,
}

/// Result type for watcher operations.
pub type NotifyResult<T> = Result<T, NotifyError>;
