// SPDX-License-Identifier: MIT
//! Schema-bound binary serializer
//!
//! The wire carries no type information beyond presence bytes and member
//! tags, so decoding always needs the expected type: either statically,
//! through [`Wire`], or as an explicit [`Shape`] for the dynamic [`Value`]
//! codec.
//!
//! ```text
//! primitive      fixed-width little-endian, no prefix
//! presence       u8: 0 = null, non-zero = present (written as 1)
//! text           [presence] utf-8 bytes 0x00
//! sequence       [presence] i32 count, elements
//! mapping        [presence] i32 count, (key, value) pairs
//! positional     [presence] members in declaration order
//! tagged         [presence] (i32 tag, value)*, i32 -1
//! enum           backing integer, no prefix
//! ```

mod macros;
mod primitive;
mod reader;
mod shape;
mod value;
mod wire;
mod writer;

pub use primitive::Primitive;
pub use reader::BinaryReader;
pub use shape::{CompositeShape, Member, Shape, Strategy};
pub use value::{decode_from_slice, decode_value, encode_to_vec, encode_value, Value};
pub use wire::{field_shape, from_bytes, read_from, to_bytes, write_slice, write_to, Wire};
pub use writer::BinaryWriter;

/// Terminator of a tagged composite
pub const SENTINEL_TAG: i32 = -1;
