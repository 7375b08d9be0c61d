// SPDX-License-Identifier: MIT
//! Box container format
//!
//! ```text
//! [length prefix][raw DEFLATE header][payload 0][payload 1]...
//! ```
//!
//! The header holds the optional manifest and the ordered `(name, length)`
//! entry table. Payloads are stored raw and back to back, so the offset of
//! each entry is the running sum of the lengths before it.

mod header;
mod reader;
mod source;
pub mod varint;
mod view;
mod writer;

pub use flate2::Compression;
pub use header::{default_compression, write_head, ContainerHeader, EntryRecord, MAX_HEADER_SIZE};
pub use reader::{BoxFile, BoxStats, EntryLocation};
pub use source::{ByteSource, SharedStream};
pub use view::EntryView;
pub use writer::BoxWriter;
