//! Move-in watcher for atomic symlink swaps.
//!
//! Watches the parent directory of a target path with inotify and reports every
//! rename that lands on the target's name, which is how "write new link, rename
//! into place" updates show up.
//!
//! # Architecture
//!
//! ```text
//! WatchChannel (inotify fd, one registration)
//!       | raw bytes
//! decoder::decode (bounds-checked record slicing)
//!       | Event
//! Notifier (reader thread -> rendezvous channel -> handler)
//! ```

mod channel;
pub mod decoder;
mod dispatch;
mod error;
mod event;

pub use channel::{
    RawEventSource, WATCH_FLAGS, Wakeup, WatchChannel, WatchId, WatchRegistration,
};
pub use decoder::{HEADER_SIZE, MIN_BUFFER_CAPACITY, Records, decode};
pub use dispatch::{Notifier, Stopped, Target, notify};
pub use error::{NotifyError, NotifyResult};
pub use event::{Event, EventMask};
