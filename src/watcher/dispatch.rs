//! Dispatch loop: watch a target's directory and hand matching events to a
//! caller-supplied handler.
//!
//! ```text
//! reader thread                         caller thread
//!   read_raw -> decode -> send  ==(0)==>  recv -> name == base? -> handler
//! ```
//!
//! The handoff channel has zero capacity, so the reader blocks until the caller
//! has taken the previous event. The raw buffer and the kernel handle both live
//! on the reader thread and are released there.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, select};

use super::channel::{RawEventSource, WatchChannel, Wakeup};
use super::decoder::{self, MIN_BUFFER_CAPACITY};
use super::error::{NotifyError, NotifyResult};
use super::event::Event;

/// Why a watch stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// The kernel side closed the channel (zero-length read).
    EndOfStream,
    /// The cancellation receiver fired.
    Cancelled,
}

/// Terminal item sent by the reader after its last event.
#[derive(Debug)]
enum Halt {
    EndOfStream,
    Failed(NotifyError),
}

type Delivery = Result<Event, Halt>;

/// A file path split into the directory to watch and the name to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    directory: PathBuf,
    base_name: String,
}

impl Target {
    /// Split `path` into its parent directory and base name.
    ///
    /// A path without a parent component is resolved against `.`.
    pub fn parse(path: impl AsRef<Path>) -> NotifyResult<Self> {
        let path = path.as_ref();
        let invalid = |reason: &str| NotifyError::InvalidTarget {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let base_name = path
            .file_name()
            .ok_or_else(|| invalid("path has no file name"))?
            .to_str()
            .ok_or_else(|| invalid("file name is not valid UTF-8"))?
            .to_string();

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            directory,
            base_name,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// True when `event` names this target.
    pub fn matches(&self, event: &Event) -> bool {
        event.name == self.base_name
    }
}

/// Watch `target` and call `handler` each time an entry with its base name is
/// moved into its directory.
///
/// Runs until the channel fails or reaches end-of-stream. Watching again after
/// that requires a fresh call.
pub fn notify<P, F>(target: P, handler: F) -> NotifyResult<Stopped>
where
    P: AsRef<Path>,
    F: FnMut(Event),
{
    Notifier::new(target)?.run(handler)
}

/// Configurable form of [`notify`].
#[derive(Debug)]
pub struct Notifier {
    target: Target,
    buffer_capacity: usize,
    cancel: Option<Receiver<()>>,
}

impl Notifier {
    pub fn new(target: impl AsRef<Path>) -> NotifyResult<Self> {
        Ok(Self {
            target: Target::parse(target)?,
            buffer_capacity: MIN_BUFFER_CAPACITY,
            cancel: None,
        })
    }

    /// Set the raw read buffer size. Values below
    /// [`MIN_BUFFER_CAPACITY`] are raised to it.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(MIN_BUFFER_CAPACITY);
        self
    }

    /// Stop when `cancel` receives a message or is disconnected.
    pub fn cancel_on(mut self, cancel: Receiver<()>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Open an inotify channel on the target directory and run the loop.
    pub fn run<F>(self, handler: F) -> NotifyResult<Stopped>
    where
        F: FnMut(Event),
    {
        let mut channel = WatchChannel::open()?;
        channel.watch(self.target.directory())?;
        self.run_with(channel, handler)
    }

    /// Run the loop over an already prepared event source.
    ///
    /// `source` is moved to the reader thread and closed there. The reader has
    /// been joined by the time this returns, cancellation included.
    pub fn run_with<S, F>(self, source: S, mut handler: F) -> NotifyResult<Stopped>
    where
        S: RawEventSource + 'static,
        F: FnMut(Event),
    {
        let Notifier {
            target,
            buffer_capacity,
            cancel,
        } = self;

        let wakeup = match cancel {
            Some(_) => Some(Arc::new(Wakeup::new()?)),
            None => None,
        };
        let reader_wakeup = wakeup.clone();

        let (tx, rx) = crossbeam_channel::bounded::<Delivery>(0);
        let reader = thread::Builder::new()
            .name("linkwatch-reader".to_string())
            .spawn(move || read_loop(source, buffer_capacity, reader_wakeup.as_deref(), tx))
            .map_err(NotifyError::Spawn)?;

        crate::log_event!(
            "notify",
            "watching",
            "{} for '{}'",
            target.directory().display(),
            target.base_name()
        );

        loop {
            let next = match &cancel {
                Some(cancel) => select! {
                    recv(rx) -> delivery => Some(delivery),
                    recv(cancel) -> _ => None,
                },
                None => Some(rx.recv()),
            };
            let Some(delivery) = next else {
                break;
            };

            match delivery {
                Ok(Ok(event)) if target.matches(&event) => {
                    crate::debug_event!("notify", "matched", "{} {:?}", event.name, event.mask);
                    handler(event);
                }
                Ok(Ok(event)) => {
                    crate::debug_event!("notify", "skipped", "'{}'", event.name);
                }
                Ok(Err(Halt::EndOfStream)) => {
                    join_reader(reader);
                    crate::log_event!("notify", "end of stream");
                    return Ok(Stopped::EndOfStream);
                }
                Ok(Err(Halt::Failed(e))) => {
                    join_reader(reader);
                    return Err(e);
                }
                Err(_) => {
                    join_reader(reader);
                    return Err(NotifyError::ReaderExited);
                }
            }
        }

        // Unblock the reader wherever it waits: a pending handoff fails once
        // `rx` is gone, a pending read returns once woken.
        drop(rx);
        if let Some(wakeup) = &wakeup {
            wakeup.wake();
        }
        join_reader(reader);
        crate::log_event!("notify", "cancelled");
        Ok(Stopped::Cancelled)
    }
}

fn join_reader(reader: JoinHandle<()>) {
    if reader.join().is_err() {
        tracing::error!("[reader] thread panicked");
    }
}

/// Reader thread body. Always closes `source` before returning.
fn read_loop<S: RawEventSource>(
    mut source: S,
    capacity: usize,
    wakeup: Option<&Wakeup>,
    tx: Sender<Delivery>,
) {
    let mut buf = vec![0u8; capacity];
    let halt = pump(&mut source, &mut buf, wakeup, &tx);

    let halt = match (halt, source.close()) {
        (Some(Halt::EndOfStream), Err(e)) => Some(Halt::Failed(e)),
        (halt, Err(e)) => {
            tracing::warn!("[reader] {e}");
            halt
        }
        (halt, Ok(())) => halt,
    };

    match halt {
        Some(halt) => {
            let _ = tx.send(Err(halt));
        }
        None => crate::debug_event!("reader", "stopped by caller"),
    }
}

/// Read and forward events until the stream ends, fails, or the caller stops
/// the watch (`None`).
fn pump<S: RawEventSource>(
    source: &mut S,
    buf: &mut [u8],
    wakeup: Option<&Wakeup>,
    tx: &Sender<Delivery>,
) -> Option<Halt> {
    loop {
        let read = match wakeup {
            Some(wakeup) => source.read_raw_or_wake(buf, wakeup),
            None => source.read_raw(buf).map(Some),
        };
        let n = match read {
            Ok(Some(0)) => return Some(Halt::EndOfStream),
            Ok(Some(n)) => n,
            Ok(None) => return None,
            Err(e) => return Some(Halt::Failed(e)),
        };
        crate::debug_event!("reader", "read", "{n} bytes");

        for record in decoder::decode(&buf[..n]) {
            match record {
                Ok(event) => {
                    if tx.send(Ok(event)).is_err() {
                        return None;
                    }
                }
                Err(e) => return Some(Halt::Failed(e)),
            }
        }
    }
}
