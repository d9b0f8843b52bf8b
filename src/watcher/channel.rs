//! Owned inotify handle with a single directory registration.

use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::inotify::{AddWatchFlags, InitFlags, Inotify, WatchDescriptor};
use nix::unistd;

use super::error::{NotifyError, NotifyResult};

/// Events requested for the watched directory.
///
/// Only renames into the directory are reported. The directory itself must not
/// be reached through a symlink and must actually be a directory.
pub const WATCH_FLAGS: AddWatchFlags = AddWatchFlags::IN_MOVED_TO
    .union(AddWatchFlags::IN_DONT_FOLLOW)
    .union(AddWatchFlags::IN_ONLYDIR);

/// Kernel watch descriptor returned by `inotify_add_watch(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(WatchDescriptor);

/// The directory a channel is watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRegistration {
    pub id: WatchId,
    pub directory: PathBuf,
}

/// Self-pipe used to pull a reader out of a blocking wait.
///
/// Once [`Wakeup::wake`] has been called the read end stays readable for good.
#[derive(Debug)]
pub struct Wakeup {
    reader: OwnedFd,
    writer: OwnedFd,
}

impl Wakeup {
    pub fn new() -> NotifyResult<Self> {
        let (reader, writer) =
            unistd::pipe2(OFlag::O_CLOEXEC).map_err(|e| NotifyError::Wakeup(e.into()))?;
        Ok(Self { reader, writer })
    }

    pub fn wake(&self) {
        if let Err(e) = unistd::write(&self.writer, &[1]) {
            tracing::warn!("[channel] wakeup write failed: {e}");
        }
    }

    fn as_fd(&self) -> BorrowedFd<'_> {
        self.reader.as_fd()
    }
}

/// A blocking source of raw inotify record bytes.
///
/// [`WatchChannel`] is the production source; the dispatch loop accepts any
/// implementation so it can be driven from recorded buffers.
pub trait RawEventSource: Send {
    /// Read pending record bytes into `buf`.
    ///
    /// Returns the number of bytes written, `0` at end-of-stream.
    fn read_raw(&mut self, buf: &mut [u8]) -> NotifyResult<usize>;

    /// Like [`read_raw`](Self::read_raw), but returns `None` as soon as
    /// `wakeup` fires.
    ///
    /// The default never waits on `wakeup`; sources whose reads can block
    /// indefinitely must override it.
    fn read_raw_or_wake(
        &mut self,
        buf: &mut [u8],
        _wakeup: &Wakeup,
    ) -> NotifyResult<Option<usize>> {
        self.read_raw(buf).map(Some)
    }

    /// Release the underlying handle. Called once when the reader stops.
    fn close(&mut self) -> NotifyResult<()> {
        Ok(())
    }
}

/// An inotify instance watching one directory.
///
/// The descriptor is released exactly once: by [`WatchChannel::close`] or,
/// failing that, on drop.
#[derive(Debug)]
pub struct WatchChannel {
    inotify: Option<Inotify>,
    registration: Option<WatchRegistration>,
}

impl WatchChannel {
    /// Create a new inotify instance.
    pub fn open() -> NotifyResult<Self> {
        let inotify = Inotify::init(InitFlags::IN_CLOEXEC)
            .map_err(|e| NotifyError::ChannelOpen(e.into()))?;

        crate::debug_event!("channel", "opened");

        Ok(Self {
            inotify: Some(inotify),
            registration: None,
        })
    }

    /// Watch `directory` for entries moved into it.
    ///
    /// Only one registration is tracked. Calling this again replaces the stored
    /// registration but leaves the earlier kernel watch in place until the
    /// channel is closed.
    pub fn watch(&mut self, directory: &Path) -> NotifyResult<WatchId> {
        let registration_error = |source: io::Error| NotifyError::WatchRegistration {
            path: directory.to_path_buf(),
            source,
        };

        let inotify = self
            .inotify
            .as_ref()
            .ok_or_else(|| registration_error(Errno::EBADF.into()))?;
        let id = inotify
            .add_watch(directory, WATCH_FLAGS)
            .map(WatchId)
            .map_err(|e| registration_error(e.into()))?;

        if let Some(previous) = self.registration.replace(WatchRegistration {
            id,
            directory: directory.to_path_buf(),
        }) {
            tracing::warn!(
                "[channel] replacing watch on {} without removing it",
                previous.directory.display()
            );
        }

        crate::debug_event!("channel", "watching", "{}", directory.display());
        Ok(id)
    }

    /// The current registration, if `watch` succeeded.
    pub fn registration(&self) -> Option<&WatchRegistration> {
        self.registration.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.inotify.is_some()
    }

    /// Block until event bytes are available and copy them into `buf`.
    ///
    /// Returns `0` once the channel has been closed.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> NotifyResult<usize> {
        let Some(inotify) = self.inotify.as_ref() else {
            return Ok(0);
        };

        loop {
            match unistd::read(inotify.as_fd(), buf) {
                Ok(n) => return Ok(n),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(NotifyError::Read(e.into())),
            }
        }
    }

    /// Wait for event bytes or for `wakeup`, whichever comes first.
    ///
    /// Returns `None` when woken. A pending wakeup wins over pending events.
    pub fn read_raw_or_wake(
        &mut self,
        buf: &mut [u8],
        wakeup: &Wakeup,
    ) -> NotifyResult<Option<usize>> {
        loop {
            let (readable, woken) = {
                let Some(inotify) = self.inotify.as_ref() else {
                    return Ok(Some(0));
                };
                let mut fds = [
                    PollFd::new(inotify.as_fd(), PollFlags::POLLIN),
                    PollFd::new(wakeup.as_fd(), PollFlags::POLLIN),
                ];
                match poll(&mut fds, PollTimeout::NONE) {
                    Ok(_) => {}
                    Err(Errno::EINTR) => continue,
                    Err(e) => return Err(NotifyError::Read(e.into())),
                }
                (has_events(&fds[0]), has_events(&fds[1]))
            };

            if woken {
                return Ok(None);
            }
            if readable {
                return self.read_raw(buf).map(Some);
            }
        }
    }

    /// Release the inotify descriptor. Later calls are no-ops.
    pub fn close(&mut self) -> NotifyResult<()> {
        if self.inotify.take().is_some() {
            self.registration = None;
            crate::debug_event!("channel", "closed");
        }
        Ok(())
    }
}

fn has_events(fd: &PollFd<'_>) -> bool {
    fd.revents().is_some_and(|revents| !revents.is_empty())
}

impl RawEventSource for WatchChannel {
    fn read_raw(&mut self, buf: &mut [u8]) -> NotifyResult<usize> {
        WatchChannel::read_raw(self, buf)
    }

    fn read_raw_or_wake(
        &mut self,
        buf: &mut [u8],
        wakeup: &Wakeup,
    ) -> NotifyResult<Option<usize>> {
        WatchChannel::read_raw_or_wake(self, buf, wakeup)
    }

    fn close(&mut self) -> NotifyResult<()> {
        WatchChannel::close(self)
    }
}

impl Drop for WatchChannel {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("[channel] {e}");
        }
    }
}
