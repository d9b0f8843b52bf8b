//! Typed inotify events.

use bitflags::bitflags;

bitflags! {
    /// inotify event bits as reported in a record's `mask` field.
    ///
    /// Unknown bits are retained, so `bits()` always returns the raw kernel value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const ACCESS = libc::IN_ACCESS;
        const MODIFY = libc::IN_MODIFY;
        const ATTRIB = libc::IN_ATTRIB;
        const CLOSE_WRITE = libc::IN_CLOSE_WRITE;
        const CLOSE_NOWRITE = libc::IN_CLOSE_NOWRITE;
        const OPEN = libc::IN_OPEN;
        const MOVED_FROM = libc::IN_MOVED_FROM;
        const MOVED_TO = libc::IN_MOVED_TO;
        const CREATE = libc::IN_CREATE;
        const DELETE = libc::IN_DELETE;
        const DELETE_SELF = libc::IN_DELETE_SELF;
        const MOVE_SELF = libc::IN_MOVE_SELF;
        const UNMOUNT = libc::IN_UNMOUNT;
        const Q_OVERFLOW = libc::IN_Q_OVERFLOW;
        const IGNORED = libc::IN_IGNORED;
        const ISDIR = libc::IN_ISDIR;

        const _ = !0;
    }
}

/// One filesystem change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event bits.
    pub mask: EventMask,
    /// Correlates the two halves of a rename (`MOVED_FROM`/`MOVED_TO`).
    pub cookie: u32,
    /// Name of the entry inside the watched directory, empty for events
    /// about the directory itself.
    pub name: String,
}

impl Event {
    pub fn new(mask: u32, cookie: u32, name: impl Into<String>) -> Self {
        Self {
            mask: EventMask::from_bits_retain(mask),
            cookie,
            name: name.into(),
        }
    }

    /// True when an entry was renamed into the watched directory.
    pub fn is_moved_in(&self) -> bool {
        self.mask.contains(EventMask::MOVED_TO)
    }

    pub fn is_dir(&self) -> bool {
        self.mask.contains(EventMask::ISDIR)
    }
}
