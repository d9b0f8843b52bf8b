//! Decoding of raw inotify read buffers.
//!
//! A single `read(2)` on an inotify descriptor returns zero or more records
//! packed back to back:
//!
//! ```text
//! offset  width  field
//!      0      4  watch descriptor (i32)
//!      4      4  mask (u32)
//!      8      4  cookie (u32)
//!     12      4  name length (u32), including NUL padding
//!     16    len  name, NUL padded
//! ```
//!
//! Fields are read by explicit slicing in native byte order; the buffer is never
//! reinterpreted as a struct.

use std::ops::Range;

use super::error::NotifyError;
use super::event::Event;

const WATCH_ID: Range<usize> = 0..4;
const MASK: Range<usize> = 4..8;
const COOKIE: Range<usize> = 8..12;
const NAME_LEN: Range<usize> = 12..16;

/// Size of the fixed record header.
pub const HEADER_SIZE: usize = 16;

const _: () = assert!(HEADER_SIZE == std::mem::size_of::<libc::inotify_event>());

/// Smallest raw buffer the reader will use: room for 4096 bare headers.
pub const MIN_BUFFER_CAPACITY: usize = HEADER_SIZE * 4096;

/// Decode every record in `buf`.
///
/// `buf` must be exactly the bytes returned by one read.
pub fn decode(buf: &[u8]) -> Records<'_> {
    Records {
        buf,
        cursor: 0,
        done: false,
    }
}

/// Iterator over the records of one read.
///
/// Yields events in buffer order. Trailing bytes that do not form a complete
/// record produce a single [`NotifyError::ShortRecord`], after which the
/// iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    buf: &'a [u8],
    cursor: usize,
    done: bool,
}

impl Records<'_> {
    /// Offset of the next undecoded byte.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    fn short_record(&mut self) -> NotifyError {
        self.done = true;
        NotifyError::ShortRecord {
            offset: self.cursor,
            remaining: self.buf.len() - self.cursor,
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Event, NotifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor == self.buf.len() {
            return None;
        }

        let rest = &self.buf[self.cursor..];
        let Some(header) = rest.get(..HEADER_SIZE) else {
            return Some(Err(self.short_record()));
        };

        let _watch_id = read_u32(header, WATCH_ID);
        let mask = read_u32(header, MASK);
        let cookie = read_u32(header, COOKIE);
        let name_len = read_u32(header, NAME_LEN) as usize;

        let Some(name_bytes) = rest.get(HEADER_SIZE..HEADER_SIZE.saturating_add(name_len)) else {
            return Some(Err(self.short_record()));
        };

        self.cursor += HEADER_SIZE + name_len;
        Some(Ok(Event::new(mask, cookie, decode_name(name_bytes))))
    }
}

fn read_u32(header: &[u8], field: Range<usize>) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&header[field]);
    u32::from_ne_bytes(bytes)
}

fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Encode one record the way the kernel lays it out, padding the name with NULs
/// to `padded_len` bytes. Test helper.
#[cfg(test)]
pub(crate) fn encode_record(mask: u32, cookie: u32, name: &str, padded_len: usize) -> Vec<u8> {
    assert!(padded_len >= name.len());
    let mut record = Vec::with_capacity(HEADER_SIZE + padded_len);
    record.extend_from_slice(&1i32.to_ne_bytes());
    record.extend_from_slice(&mask.to_ne_bytes());
    record.extend_from_slice(&cookie.to_ne_bytes());
    record.extend_from_slice(&(padded_len as u32).to_ne_bytes());
    record.extend_from_slice(name.as_bytes());
    record.resize(HEADER_SIZE + padded_len, 0);
    record
}
