// SPDX-License-Identifier: MIT
//! Low-level binary reader used by every decoder

use std::io::{BufRead, Read};

use super::primitive::{decode_le_slice, Primitive};
use crate::error::SerializeError;

/// Reads primitives, presence bytes, counts and text from a buffered source
pub struct BinaryReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: BufRead> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// Number of bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.consumed
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), SerializeError> {
        self.inner
            .read_exact(buf)
            .map_err(|e| SerializeError::from_read(e, context))?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    #[inline]
    pub fn read_primitive<T: Primitive>(&mut self) -> Result<T, SerializeError> {
        let mut buf = [0u8; 8];
        let buf = &mut buf[..T::WIDTH];
        self.fill(buf, T::NAME)?;
        Ok(T::from_le_slice(buf))
    }

    pub fn read_u8(&mut self) -> Result<u8, SerializeError> {
        self.read_primitive()
    }

    pub fn read_i32(&mut self) -> Result<i32, SerializeError> {
        self.read_primitive()
    }

    /// Any non-zero presence byte means a value follows
    pub fn read_presence(&mut self) -> Result<bool, SerializeError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_count(&mut self, context: &'static str) -> Result<usize, SerializeError> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| SerializeError::InvalidLength {
            context,
            length: i64::from(count),
        })
    }

    pub fn read_tag(&mut self) -> Result<i32, SerializeError> {
        self.read_i32()
    }

    /// Text up to (and excluding) the next NUL byte
    pub fn read_text(&mut self) -> Result<String, SerializeError> {
        let mut bytes = Vec::new();
        let n = self.inner.read_until(0, &mut bytes)?;
        self.consumed += n as u64;
        if bytes.pop() != Some(0) {
            return Err(SerializeError::TruncatedInput { context: "text" });
        }
        Ok(String::from_utf8(bytes)?)
    }

    /// Bulk path for numeric sequences: `count * WIDTH` raw bytes
    pub fn read_le_vec<T: Primitive>(&mut self, count: usize) -> Result<Vec<T>, SerializeError> {
        let byte_len = count
            .checked_mul(T::WIDTH)
            .ok_or(SerializeError::InvalidLength {
                context: T::NAME,
                length: count as i64,
            })?;

        // Grow with the data actually present instead of trusting the count
        let mut block = Vec::new();
        (&mut self.inner)
            .take(byte_len as u64)
            .read_to_end(&mut block)?;
        self.consumed += block.len() as u64;
        if block.len() < byte_len {
            return Err(SerializeError::TruncatedInput { context: T::NAME });
        }
        Ok(decode_le_slice(&block))
    }

    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<(), SerializeError> {
        self.fill(buf, "raw bytes")
    }
}
