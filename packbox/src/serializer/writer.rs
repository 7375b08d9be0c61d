// SPDX-License-Identifier: MIT
//! Low-level binary writer used by every encoder

use std::io::Write;

use super::primitive::{encode_le_slice, Primitive};
use super::SENTINEL_TAG;
use crate::error::SerializeError;

/// Writes primitives, presence bytes, counts and text to an underlying sink
pub struct BinaryWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Number of bytes emitted so far
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    #[inline]
    pub fn write_primitive<T: Primitive>(&mut self, value: T) -> Result<(), SerializeError> {
        self.put(value.le_bytes().as_ref())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), SerializeError> {
        self.put(&[value])
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), SerializeError> {
        self.put(&value.to_le_bytes())
    }

    /// Presence byte preceding every nullable value: `1` present, `0` null
    pub fn write_presence(&mut self, present: bool) -> Result<(), SerializeError> {
        self.write_u8(u8::from(present))
    }

    /// Element or entry count, stored as a signed 32-bit integer
    pub fn write_count(&mut self, count: usize, context: &'static str) -> Result<(), SerializeError> {
        let count = i32::try_from(count).map_err(|_| SerializeError::InvalidLength {
            context,
            length: count as i64,
        })?;
        self.write_i32(count)
    }

    pub fn write_tag(&mut self, tag: i32) -> Result<(), SerializeError> {
        self.write_i32(tag)
    }

    pub fn write_sentinel(&mut self) -> Result<(), SerializeError> {
        self.write_i32(SENTINEL_TAG)
    }

    /// UTF-8 bytes followed by a NUL terminator. Embedded NULs are not escaped.
    pub fn write_text(&mut self, text: &str) -> Result<(), SerializeError> {
        self.put(text.as_bytes())?;
        self.write_u8(0)
    }

    /// Bulk path for numeric sequences: one contiguous little-endian block
    pub fn write_le_slice<T: Primitive>(&mut self, items: &[T]) -> Result<(), SerializeError> {
        let block = encode_le_slice(items);
        self.put(&block)
    }

    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        self.put(bytes)
    }

    pub fn flush(&mut self) -> Result<(), SerializeError> {
        self.inner.flush()?;
        Ok(())
    }
}
