// SPDX-License-Identifier: MIT
//! Error types for the serializer and the container format

use std::fmt;

/// Coarse classification of every failure the crate can report.
///
/// Command-line callers print this next to the failing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Fewer bytes were available than a field requires
    TruncatedInput,
    /// A tagged composite carried a tag the target type does not declare
    UnknownTag,
    /// The container header could not be decompressed or decoded
    MalformedContainer,
    /// A name or resource lookup found nothing
    NotFound,
    /// A write or resize was attempted on a read-only view
    InvalidOperation,
    /// Any other I/O failure of the underlying source or sink
    Io,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::TruncatedInput => "truncated-input",
            ErrorKind::UnknownTag => "unknown-tag",
            ErrorKind::MalformedContainer => "malformed-container",
            ErrorKind::NotFound => "not-found",
            ErrorKind::InvalidOperation => "invalid-operation",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while encoding or decoding values
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated input while reading {context}")]
    TruncatedInput { context: &'static str },

    #[error("Unknown tag {tag} for {record}")]
    UnknownTag { record: String, tag: i32 },

    #[error("Invalid length {length} for {context}")]
    InvalidLength { context: &'static str, length: i64 },

    #[error("Invalid UTF-8 in text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("Invalid value {value} for enum {name}")]
    InvalidEnum { name: &'static str, value: i64 },

    #[error("Value does not match expected shape: {0}")]
    ShapeMismatch(String),
}

impl SerializeError {
    /// Map an I/O error from a fixed-width read, turning EOF into truncation.
    pub(crate) fn from_read(err: std::io::Error, context: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            SerializeError::TruncatedInput { context }
        } else {
            SerializeError::Io(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SerializeError::Io(_) => ErrorKind::Io,
            SerializeError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            SerializeError::UnknownTag { .. } => ErrorKind::UnknownTag,
            SerializeError::InvalidLength { .. }
            | SerializeError::InvalidText(_)
            | SerializeError::InvalidEnum { .. }
            | SerializeError::ShapeMismatch(_) => ErrorKind::MalformedContainer,
        }
    }
}

/// Errors that can occur while writing or loading a box
#[derive(Debug, thiserror::Error)]
pub enum BoxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated container: expected {expected} bytes, {available} available")]
    TruncatedInput { expected: u64, available: u64 },

    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    #[error("Malformed container header: {0}")]
    Header(#[source] SerializeError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("Entry already added: {0}")]
    DuplicateEntry(String),

    #[error("Entry {name} is too large: {length} bytes")]
    EntryTooLarge { name: String, length: u64 },
}

impl BoxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoxError::Io(_) => ErrorKind::Io,
            BoxError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            BoxError::MalformedContainer(_) | BoxError::DuplicateEntry(_) => {
                ErrorKind::MalformedContainer
            }
            BoxError::Header(inner) => match inner.kind() {
                ErrorKind::UnknownTag => ErrorKind::UnknownTag,
                ErrorKind::Io => ErrorKind::Io,
                _ => ErrorKind::MalformedContainer,
            },
            BoxError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            BoxError::EntryTooLarge { .. } => ErrorKind::InvalidOperation,
        }
    }
}

/// Errors that can occur while resolving a resource URI
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid resource URI: {0}")]
    InvalidUri(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ResourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResourceError::Io(_) => ErrorKind::Io,
            ResourceError::InvalidUri(_) => ErrorKind::InvalidOperation,
            ResourceError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<BoxError> for std::io::Error {
    fn from(err: BoxError) -> Self {
        match err {
            BoxError::Io(inner) => inner,
            BoxError::InvalidOperation(_) => {
                std::io::Error::new(std::io::ErrorKind::Unsupported, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
