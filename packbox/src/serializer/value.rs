// SPDX-License-Identifier: MIT
//! Dynamic values encoded against an explicit [`Shape`]
//!
//! This is the schema-driven counterpart to the typed [`Wire`](super::Wire)
//! layer: the caller supplies the expected shape and the codec walks it.
//! Both layers produce identical bytes for the same logical value.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use super::reader::BinaryReader;
use super::shape::{CompositeShape, Shape, Strategy};
use super::writer::BinaryWriter;
use super::SENTINEL_TAG;
use crate::error::SerializeError;

/// A decoded value, structurally mirroring [`Shape`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Enum(Box<Value>),
    Sequence(Vec<Value>),
    Mapping(Vec<(Value, Value)>),
    /// Named members; order follows the composite shape
    Composite(Vec<(String, Value)>),
}

impl Value {
    /// Short name of the variant, used in mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::I8(_) => "i8",
            Value::U8(_) => "u8",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Text(_) => "text",
            Value::Enum(_) => "enum",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Composite(_) => "composite",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a composite member by name
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Composite(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

fn mismatch(shape: &Shape, value: &Value) -> SerializeError {
    SerializeError::ShapeMismatch(format!("expected {}, found {}", shape, value.kind_name()))
}

/// Encode `value` as `shape`, including the presence byte for nullable shapes
pub fn encode_value<W: Write>(
    value: &Value,
    shape: &Shape,
    w: &mut BinaryWriter<W>,
) -> Result<(), SerializeError> {
    match shape {
        Shape::Optional(inner) => {
            if value.is_null() {
                return w.write_presence(false);
            }
            w.write_presence(true)?;
            encode_body(value, inner, w)
        }
        _ if shape.is_nullable() => {
            if value.is_null() {
                return w.write_presence(false);
            }
            w.write_presence(true)?;
            encode_body(value, shape, w)
        }
        _ => encode_body(value, shape, w),
    }
}

fn encode_body<W: Write>(
    value: &Value,
    shape: &Shape,
    w: &mut BinaryWriter<W>,
) -> Result<(), SerializeError> {
    match (shape, value) {
        (Shape::I8, Value::I8(v)) => w.write_primitive(*v),
        (Shape::U8, Value::U8(v)) => w.write_primitive(*v),
        (Shape::I16, Value::I16(v)) => w.write_primitive(*v),
        (Shape::U16, Value::U16(v)) => w.write_primitive(*v),
        (Shape::I32, Value::I32(v)) => w.write_primitive(*v),
        (Shape::U32, Value::U32(v)) => w.write_primitive(*v),
        (Shape::I64, Value::I64(v)) => w.write_primitive(*v),
        (Shape::U64, Value::U64(v)) => w.write_primitive(*v),
        (Shape::F32, Value::F32(v)) => w.write_primitive(*v),
        (Shape::F64, Value::F64(v)) => w.write_primitive(*v),
        (Shape::Text, Value::Text(s)) => w.write_text(s),
        (Shape::Enum { repr, .. }, Value::Enum(inner)) => encode_body(inner, repr, w),
        // A bare integer of the backing width is accepted too
        (Shape::Enum { repr, .. }, other) => encode_body(other, repr, w),
        (Shape::Sequence(elem), Value::Sequence(items)) => {
            w.write_count(items.len(), "sequence")?;
            encode_sequence(elem, items, w)
        }
        (Shape::Mapping(key_shape, value_shape), Value::Mapping(pairs)) => {
            w.write_count(pairs.len(), "mapping")?;
            let mut seen = HashSet::with_capacity(pairs.len());
            for (key, val) in pairs {
                let key_bytes = encode_to_vec(key, key_shape)?;
                if seen.contains(&key_bytes) {
                    return Err(duplicate_key());
                }
                w.write_raw(&key_bytes)?;
                seen.insert(key_bytes);
                encode_value(val, value_shape, w)?;
            }
            Ok(())
        }
        (Shape::Composite(composite), Value::Composite(members)) => {
            encode_composite(composite, members, w)
        }
        (Shape::Optional(_), _) => encode_value(value, shape, w),
        _ => Err(mismatch(shape, value)),
    }
}

fn duplicate_key() -> SerializeError {
    SerializeError::ShapeMismatch("duplicate mapping key".into())
}

/// Collect the elements into a typed block for [`BinaryWriter::write_le_slice`]
macro_rules! numeric_slice {
    ($w:expr, $shape:expr, $items:expr, $ty:ty, $variant:ident) => {{
        let block = $items
            .iter()
            .map(|item| match item {
                Value::$variant(v) => Ok(*v),
                other => Err(mismatch($shape, other)),
            })
            .collect::<Result<Vec<$ty>, _>>()?;
        $w.write_le_slice(&block)
    }};
}

fn encode_sequence<W: Write>(
    elem: &Shape,
    items: &[Value],
    w: &mut BinaryWriter<W>,
) -> Result<(), SerializeError> {
    match elem {
        Shape::I8 => numeric_slice!(w, elem, items, i8, I8),
        Shape::U8 => numeric_slice!(w, elem, items, u8, U8),
        Shape::I16 => numeric_slice!(w, elem, items, i16, I16),
        Shape::U16 => numeric_slice!(w, elem, items, u16, U16),
        Shape::I32 => numeric_slice!(w, elem, items, i32, I32),
        Shape::U32 => numeric_slice!(w, elem, items, u32, U32),
        Shape::I64 => numeric_slice!(w, elem, items, i64, I64),
        Shape::U64 => numeric_slice!(w, elem, items, u64, U64),
        Shape::F32 => numeric_slice!(w, elem, items, f32, F32),
        Shape::F64 => numeric_slice!(w, elem, items, f64, F64),
        _ => items.iter().try_for_each(|item| encode_value(item, elem, w)),
    }
}

fn encode_composite<W: Write>(
    composite: &CompositeShape,
    members: &[(String, Value)],
    w: &mut BinaryWriter<W>,
) -> Result<(), SerializeError> {
    if let Some((name, _)) = members
        .iter()
        .find(|(name, _)| !composite.members.iter().any(|m| &m.name == name))
    {
        return Err(SerializeError::ShapeMismatch(format!(
            "{} has no member {}",
            composite.name, name
        )));
    }

    let lookup = |name: &str| members.iter().find(|(n, _)| n == name).map(|(_, v)| v);

    match composite.strategy {
        Strategy::Positional => {
            for member in &composite.members {
                let value = lookup(member.name.as_str()).ok_or_else(|| {
                    SerializeError::ShapeMismatch(format!(
                        "{} is missing member {}",
                        composite.name, member.name
                    ))
                })?;
                encode_value(value, &member.shape, w)?;
            }
            Ok(())
        }
        Strategy::Tagged => {
            for member in &composite.members {
                let Some(value) = lookup(member.name.as_str()) else {
                    continue;
                };
                let tag = member.tag.ok_or_else(|| {
                    SerializeError::ShapeMismatch(format!(
                        "{}.{} has no tag",
                        composite.name, member.name
                    ))
                })?;
                w.write_tag(tag)?;
                encode_value(value, &member.shape, w)?;
            }
            w.write_sentinel()
        }
    }
}

/// Decode a value of `shape`, consuming its presence byte if it has one.
///
/// A null presence byte yields [`Value::Null`].
pub fn decode_value<R: BufRead>(
    shape: &Shape,
    r: &mut BinaryReader<R>,
) -> Result<Value, SerializeError> {
    match shape {
        Shape::Optional(inner) => {
            if !r.read_presence()? {
                return Ok(Value::Null);
            }
            decode_body(inner, r)
        }
        _ if shape.is_nullable() => {
            if !r.read_presence()? {
                return Ok(Value::Null);
            }
            decode_body(shape, r)
        }
        _ => decode_body(shape, r),
    }
}

macro_rules! numeric_block {
    ($r:expr, $count:expr, $ty:ty, $variant:ident) => {
        $r.read_le_vec::<$ty>($count)?
            .into_iter()
            .map(Value::$variant)
            .collect()
    };
}

fn decode_body<R: BufRead>(shape: &Shape, r: &mut BinaryReader<R>) -> Result<Value, SerializeError> {
    Ok(match shape {
        Shape::I8 => Value::I8(r.read_primitive()?),
        Shape::U8 => Value::U8(r.read_primitive()?),
        Shape::I16 => Value::I16(r.read_primitive()?),
        Shape::U16 => Value::U16(r.read_primitive()?),
        Shape::I32 => Value::I32(r.read_primitive()?),
        Shape::U32 => Value::U32(r.read_primitive()?),
        Shape::I64 => Value::I64(r.read_primitive()?),
        Shape::U64 => Value::U64(r.read_primitive()?),
        Shape::F32 => Value::F32(r.read_primitive()?),
        Shape::F64 => Value::F64(r.read_primitive()?),
        Shape::Text => Value::Text(r.read_text()?),
        Shape::Enum { repr, .. } => Value::Enum(Box::new(decode_body(repr, r)?)),
        Shape::Sequence(elem) => {
            let count = r.read_count("sequence")?;
            Value::Sequence(decode_sequence(elem, count, r)?)
        }
        Shape::Mapping(key_shape, value_shape) => {
            let count = r.read_count("mapping")?;
            let mut pairs = Vec::with_capacity(count.min(4096));
            let mut seen = HashSet::with_capacity(count.min(4096));
            for _ in 0..count {
                let key = decode_value(key_shape, r)?;
                if !seen.insert(encode_to_vec(&key, key_shape)?) {
                    return Err(duplicate_key());
                }
                let value = decode_value(value_shape, r)?;
                pairs.push((key, value));
            }
            Value::Mapping(pairs)
        }
        Shape::Composite(composite) => decode_composite(composite, r)?,
        Shape::Optional(_) => decode_value(shape, r)?,
    })
}

fn decode_sequence<R: BufRead>(
    elem: &Shape,
    count: usize,
    r: &mut BinaryReader<R>,
) -> Result<Vec<Value>, SerializeError> {
    Ok(match elem {
        Shape::I8 => numeric_block!(r, count, i8, I8),
        Shape::U8 => numeric_block!(r, count, u8, U8),
        Shape::I16 => numeric_block!(r, count, i16, I16),
        Shape::U16 => numeric_block!(r, count, u16, U16),
        Shape::I32 => numeric_block!(r, count, i32, I32),
        Shape::U32 => numeric_block!(r, count, u32, U32),
        Shape::I64 => numeric_block!(r, count, i64, I64),
        Shape::U64 => numeric_block!(r, count, u64, U64),
        Shape::F32 => numeric_block!(r, count, f32, F32),
        Shape::F64 => numeric_block!(r, count, f64, F64),
        _ => {
            let mut items = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                items.push(decode_value(elem, r)?);
            }
            items
        }
    })
}

fn decode_composite<R: BufRead>(
    composite: &CompositeShape,
    r: &mut BinaryReader<R>,
) -> Result<Value, SerializeError> {
    match composite.strategy {
        Strategy::Positional => {
            let mut members = Vec::with_capacity(composite.members.len());
            for member in &composite.members {
                members.push((member.name.clone(), decode_value(&member.shape, r)?));
            }
            Ok(Value::Composite(members))
        }
        Strategy::Tagged => {
            let mut slots: Vec<Option<Value>> = vec![None; composite.members.len()];
            loop {
                let tag = r.read_tag()?;
                if tag == SENTINEL_TAG {
                    break;
                }
                let index = composite
                    .members
                    .iter()
                    .position(|m| m.tag == Some(tag))
                    .ok_or_else(|| SerializeError::UnknownTag {
                        record: composite.name.clone(),
                        tag,
                    })?;
                slots[index] = Some(decode_value(&composite.members[index].shape, r)?);
            }
            let members = composite
                .members
                .iter()
                .zip(slots)
                .filter_map(|(m, slot)| slot.map(|v| (m.name.clone(), v)))
                .collect();
            Ok(Value::Composite(members))
        }
    }
}

/// Encode into a fresh buffer
pub fn encode_to_vec(value: &Value, shape: &Shape) -> Result<Vec<u8>, SerializeError> {
    let mut w = BinaryWriter::new(Vec::new());
    encode_value(value, shape, &mut w)?;
    Ok(w.into_inner())
}

/// Decode from the start of `bytes`
pub fn decode_from_slice(shape: &Shape, bytes: &[u8]) -> Result<Value, SerializeError> {
    let mut r = BinaryReader::new(bytes);
    decode_value(shape, &mut r)
}
