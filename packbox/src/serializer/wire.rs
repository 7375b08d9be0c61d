// SPDX-License-Identifier: MIT
//! Typed encoding: the [`Wire`] trait and its implementations for std types

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::io::{BufRead, Write};

use super::reader::BinaryReader;
use super::shape::Shape;
use super::writer::BinaryWriter;
use crate::error::SerializeError;

/// Upper bound on speculative preallocation while decoding counted collections
const PREALLOC_LIMIT: usize = 4096;

/// A type with a static, schema-bound wire representation.
///
/// The static type alone decides the wire shape; nothing on the wire says
/// which type follows. Nullable types (text, sequences, mappings, reference
/// composites) are preceded by a presence byte, everything else is written
/// bare.
pub trait Wire: Sized {
    /// Whether a presence byte precedes the body on the wire
    const NULLABLE: bool = false;

    /// Write the value without its presence byte
    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError>;

    /// Read the value body (the presence byte has already been consumed)
    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError>;

    /// Descriptor of the wire shape of this type
    fn shape() -> Shape;

    /// Value produced when a nullable type reads a null presence byte
    fn null_value() -> Option<Self> {
        None
    }

    fn write<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        if Self::NULLABLE {
            w.write_presence(true)?;
        }
        self.write_body(w)
    }

    fn read<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        if Self::NULLABLE && !r.read_presence()? {
            return Self::null_value().ok_or_else(|| {
                SerializeError::ShapeMismatch(format!("null value for {}", Self::shape()))
            });
        }
        Self::read_body(r)
    }

    /// Write the elements of a sequence; numeric primitives override this
    /// with a single little-endian block.
    fn write_seq<W: Write>(items: &[Self], w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        for item in items {
            item.write(w)?;
        }
        Ok(())
    }

    /// Read `count` sequence elements; numeric primitives override this
    /// with a single little-endian block.
    fn read_seq<R: BufRead>(
        count: usize,
        r: &mut BinaryReader<R>,
    ) -> Result<Vec<Self>, SerializeError> {
        let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            items.push(Self::read(r)?);
        }
        Ok(items)
    }
}

/// Encode a value into a fresh buffer
pub fn to_bytes<T: Wire>(value: &T) -> Result<Vec<u8>, SerializeError> {
    let mut w = BinaryWriter::new(Vec::new());
    value.write(&mut w)?;
    Ok(w.into_inner())
}

/// Decode a value from the start of `bytes`; trailing bytes are left unread
pub fn from_bytes<T: Wire>(bytes: &[u8]) -> Result<T, SerializeError> {
    let mut r = BinaryReader::new(bytes);
    T::read(&mut r)
}

/// Encode a value to any sink
pub fn write_to<T: Wire, W: Write>(value: &T, sink: W) -> Result<u64, SerializeError> {
    let mut w = BinaryWriter::new(sink);
    value.write(&mut w)?;
    w.flush()?;
    Ok(w.bytes_written())
}

/// Decode a value from any buffered source
pub fn read_from<T: Wire, R: BufRead>(source: R) -> Result<T, SerializeError> {
    let mut r = BinaryReader::new(source);
    T::read(&mut r)
}

/// Write a slice with the same bytes as a `Vec<T>` holding the same elements
pub fn write_slice<T: Wire, W: Write>(
    items: &[T],
    w: &mut BinaryWriter<W>,
) -> Result<(), SerializeError> {
    w.write_presence(true)?;
    w.write_count(items.len(), "sequence")?;
    T::write_seq(items, w)
}

/// Wire shape of a composite member, inferred from a field accessor.
///
/// Used by `wire_record!` to describe members without naming their types.
pub fn field_shape<S, T: Wire>(_field: impl Fn(&S) -> &T) -> Shape {
    T::shape()
}

macro_rules! impl_wire_primitive {
    ($($ty:ty => $shape:ident),* $(,)?) => {
        $(
            impl Wire for $ty {
                #[inline]
                fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
                    w.write_primitive(*self)
                }

                #[inline]
                fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
                    r.read_primitive()
                }

                fn shape() -> Shape {
                    Shape::$shape
                }

                fn write_seq<W: Write>(items: &[Self], w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
                    w.write_le_slice(items)
                }

                fn read_seq<R: BufRead>(count: usize, r: &mut BinaryReader<R>) -> Result<Vec<Self>, SerializeError> {
                    r.read_le_vec(count)
                }
            }
        )*
    };
}

impl_wire_primitive! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl Wire for String {
    const NULLABLE: bool = true;

    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        w.write_text(self)
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        r.read_text()
    }

    fn shape() -> Shape {
        Shape::Text
    }

    fn null_value() -> Option<Self> {
        Some(String::new())
    }
}

/// `None` is a zero presence byte; `Some` is a one followed by the body.
impl<T: Wire> Wire for Option<T> {
    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        match self {
            Some(value) => {
                w.write_presence(true)?;
                value.write_body(w)
            }
            None => w.write_presence(false),
        }
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        if r.read_presence()? {
            T::read_body(r).map(Some)
        } else {
            Ok(None)
        }
    }

    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }
}

impl<T: Wire> Wire for Box<T> {
    const NULLABLE: bool = T::NULLABLE;

    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        (**self).write_body(w)
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        T::read_body(r).map(Box::new)
    }

    fn shape() -> Shape {
        T::shape()
    }

    fn null_value() -> Option<Self> {
        T::null_value().map(Box::new)
    }
}

impl<T: Wire> Wire for Vec<T> {
    const NULLABLE: bool = true;

    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        w.write_count(self.len(), "sequence")?;
        T::write_seq(self, w)
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        let count = r.read_count("sequence")?;
        T::read_seq(count, r)
    }

    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn null_value() -> Option<Self> {
        Some(Vec::new())
    }
}

/// Fixed-size arrays share the sequence layout, count prefix included.
impl<T: Wire, const N: usize> Wire for [T; N] {
    const NULLABLE: bool = true;

    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        w.write_count(N, "array")?;
        T::write_seq(self, w)
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        let count = r.read_count("array")?;
        if count != N {
            return Err(SerializeError::InvalidLength {
                context: "array",
                length: count as i64,
            });
        }
        let items = T::read_seq(count, r)?;
        items.try_into().map_err(|_| SerializeError::InvalidLength {
            context: "array",
            length: count as i64,
        })
    }

    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<K, V> Wire for HashMap<K, V>
where
    K: Wire + Eq + Hash,
    V: Wire,
{
    const NULLABLE: bool = true;

    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        w.write_count(self.len(), "mapping")?;
        for (key, value) in self {
            key.write(w)?;
            value.write(w)?;
        }
        Ok(())
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        let count = r.read_count("mapping")?;
        let mut map = HashMap::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            let key = K::read(r)?;
            let value = V::read(r)?;
            if map.insert(key, value).is_some() {
                return Err(SerializeError::ShapeMismatch("duplicate mapping key".into()));
            }
        }
        Ok(map)
    }

    fn shape() -> Shape {
        Shape::Mapping(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn null_value() -> Option<Self> {
        Some(HashMap::new())
    }
}

impl<K, V> Wire for BTreeMap<K, V>
where
    K: Wire + Ord,
    V: Wire,
{
    const NULLABLE: bool = true;

    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        w.write_count(self.len(), "mapping")?;
        for (key, value) in self {
            key.write(w)?;
            value.write(w)?;
        }
        Ok(())
    }

    fn read_body<R: BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        let count = r.read_count("mapping")?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key = K::read(r)?;
            let value = V::read(r)?;
            if map.insert(key, value).is_some() {
                return Err(SerializeError::ShapeMismatch("duplicate mapping key".into()));
            }
        }
        Ok(map)
    }

    fn shape() -> Shape {
        Shape::Mapping(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn null_value() -> Option<Self> {
        Some(BTreeMap::new())
    }
}
