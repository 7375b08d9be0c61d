// SPDX-License-Identifier: MIT
//! Read-only byte-range view over one box entry

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use super::source::ByteSource;
use crate::error::BoxError;

/// A seekable, read-only window `[start, start + len)` of a shared source.
///
/// Views borrow the source, keep their own position and never touch any
/// other view's state. Position `0` is the first byte of the entry.
pub struct EntryView<'a, S: ?Sized> {
    source: &'a S,
    start: u64,
    len: u64,
    pos: u64,
}

impl<'a, S: ByteSource + ?Sized> EntryView<'a, S> {
    pub fn new(source: &'a S, start: u64, len: u64) -> Self {
        Self {
            source,
            start,
            len,
            pos: 0,
        }
    }

    /// Length of the entry in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute offset of the entry within the source
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Entries are fixed once written
    pub fn set_len(&mut self, _len: u64) -> Result<(), BoxError> {
        Err(BoxError::InvalidOperation("cannot resize an entry view"))
    }

    /// Read the whole entry regardless of the current position
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let len = usize::try_from(self.len)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "entry too large"))?;
        let mut buf = vec![0u8; len];
        self.source.read_exact_at(self.start, &mut buf)?;
        Ok(buf)
    }
}

impl<S: ?Sized> Clone for EntryView<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            start: self.start,
            len: self.len,
            pos: self.pos,
        }
    }
}

impl<S: ?Sized> fmt::Debug for EntryView<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryView")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("pos", &self.pos)
            .finish()
    }
}

impl<S: ByteSource + ?Sized> Read for EntryView<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self.source.read_at(self.start + self.pos, &mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<S: ByteSource + ?Sized> Seek for EntryView<'_, S> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match target {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::Current(n) => (self.pos, n),
            SeekFrom::End(n) => (self.len, n),
        };
        match base.checked_add_signed(offset) {
            Some(pos) => {
                self.pos = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

impl<S: ?Sized> Write for EntryView<'_, S> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(BoxError::InvalidOperation("entry views are read-only").into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
