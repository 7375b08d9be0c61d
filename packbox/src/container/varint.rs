// SPDX-License-Identifier: MIT
//! Length prefix of the compressed header
//!
//! Seven bits per byte, least significant group first. Unlike LEB128 the
//! *last* byte carries the high bit and every earlier byte has it clear:
//!
//! ```text
//! 0       -> 80
//! 127     -> FF
//! 128     -> 00 81
//! 16384   -> 00 00 81
//! ```

use std::io::{self, Write};

use crate::error::BoxError;

/// Longest encoding of a 64-bit length
pub const MAX_LENGTH_PREFIX: usize = 10;

const STOP_BIT: u8 = 0x80;

/// Encode `value` into a small stack buffer, returning the used prefix
pub fn encode_length(mut value: u64) -> ([u8; MAX_LENGTH_PREFIX], usize) {
    let mut buf = [0u8; MAX_LENGTH_PREFIX];
    let mut len = 0;
    loop {
        let group = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf[len] = group | STOP_BIT;
            return (buf, len + 1);
        }
        buf[len] = group;
        len += 1;
    }
}

/// Number of bytes `encode_length` produces for `value`
pub fn length_size(value: u64) -> usize {
    encode_length(value).1
}

pub fn write_length<W: Write>(w: &mut W, value: u64) -> io::Result<usize> {
    let (buf, len) = encode_length(value);
    w.write_all(&buf[..len])?;
    Ok(len)
}

/// Decode a length prefix from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_length(bytes: &[u8]) -> Result<(u64, usize), BoxError> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().take(MAX_LENGTH_PREFIX).enumerate() {
        let group = u64::from(byte & 0x7F);
        let shift = 7 * i as u32;
        // The tenth byte only has room for the top bit of a u64
        if shift == 63 && group > 1 {
            return Err(BoxError::MalformedContainer(
                "length prefix overflows 64 bits".into(),
            ));
        }
        value |= group << shift;
        if byte & STOP_BIT != 0 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() < MAX_LENGTH_PREFIX {
        Err(BoxError::TruncatedInput {
            expected: bytes.len() as u64 + 1,
            available: bytes.len() as u64,
        })
    } else {
        Err(BoxError::MalformedContainer(
            "unterminated length prefix".into(),
        ))
    }
}
