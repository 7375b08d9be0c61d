// SPDX-License-Identifier: MIT
//! Wire shape descriptors
//!
//! A [`Shape`] is the expected type of a value at a decode site. The typed
//! layer derives it from `Wire::shape()`; the dynamic layer takes it as an
//! explicit argument.

use std::fmt;

/// Composite member encoding strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Members in declaration order, no tags, no terminator
    Positional,
    /// `(i32 tag, value)` pairs terminated by the sentinel tag
    Tagged,
}

/// One member of a composite shape
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    /// Wire tag; `None` for positional members
    pub tag: Option<i32>,
    pub shape: Shape,
}

impl Member {
    pub fn positional(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            tag: None,
            shape,
        }
    }

    pub fn tagged(name: impl Into<String>, tag: i32, shape: Shape) -> Self {
        Self {
            name: name.into(),
            tag: Some(tag),
            shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeShape {
    pub name: String,
    pub strategy: Strategy,
    /// Reference composites carry a presence byte; by-value ones do not
    pub nullable: bool,
    pub members: Vec<Member>,
}

impl CompositeShape {
    pub fn member_by_tag(&self, tag: i32) -> Option<&Member> {
        self.members.iter().find(|m| m.tag == Some(tag))
    }
}

/// Expected type of an encoded value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Text,
    /// Enumeration backed by one integer width
    Enum { name: String, repr: Box<Shape> },
    Sequence(Box<Shape>),
    Mapping(Box<Shape>, Box<Shape>),
    Composite(Box<CompositeShape>),
    /// Presence byte in front of an otherwise non-nullable shape
    Optional(Box<Shape>),
}

impl Shape {
    /// Whether a presence byte precedes values of this shape
    pub fn is_nullable(&self) -> bool {
        match self {
            Shape::Text | Shape::Sequence(_) | Shape::Mapping(..) => true,
            Shape::Composite(c) => c.nullable,
            _ => false,
        }
    }

    /// Whether sequences of this shape take the bulk little-endian path
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Shape::I8
                | Shape::U8
                | Shape::I16
                | Shape::U16
                | Shape::I32
                | Shape::U32
                | Shape::I64
                | Shape::U64
                | Shape::F32
                | Shape::F64
        )
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::I8 => f.write_str("i8"),
            Shape::U8 => f.write_str("u8"),
            Shape::I16 => f.write_str("i16"),
            Shape::U16 => f.write_str("u16"),
            Shape::I32 => f.write_str("i32"),
            Shape::U32 => f.write_str("u32"),
            Shape::I64 => f.write_str("i64"),
            Shape::U64 => f.write_str("u64"),
            Shape::F32 => f.write_str("f32"),
            Shape::F64 => f.write_str("f64"),
            Shape::Text => f.write_str("text"),
            Shape::Enum { name, .. } => f.write_str(name),
            Shape::Sequence(elem) => write!(f, "sequence<{}>", elem),
            Shape::Mapping(key, value) => write!(f, "mapping<{}, {}>", key, value),
            Shape::Composite(c) => f.write_str(&c.name),
            Shape::Optional(inner) => write!(f, "optional<{}>", inner),
        }
    }
}
