// SPDX-License-Identifier: MIT
//! # Packbox
//!
//! A schema-bound binary serializer and a single-file container ("box") for
//! packaging named resources together with a content manifest.
//!
//! ## Serializer
//!
//! Values are encoded against their *expected* type. Nothing on the wire
//! says what follows; the reader must already know. The only markers are a
//! presence byte in front of nullable values and integer tags inside tagged
//! composites.
//!
//! - **Typed**: implement [`serializer::Wire`] with [`wire_record!`] and
//!   [`wire_enum!`], then use [`serializer::to_bytes`] /
//!   [`serializer::from_bytes`].
//! - **Dynamic**: describe the type as a [`serializer::Shape`] and encode a
//!   [`serializer::Value`] with [`serializer::encode_value`].
//!
//! ## Box Format
//!
//! ```text
//! Box file
//! ========
//!
//! Length prefix (1-10 bytes):
//! - 7 bits per byte, least significant group first
//! - last byte has bit 7 set, earlier bytes have it clear
//!
//! Header (raw DEFLATE, length given by the prefix):
//! - manifest: optional tagged composite
//! - entries:  sequence of (name: text, length: i32)
//!
//! Payloads (raw, back to back, in entry order)
//! ```
//!
//! Loading decodes the header once and builds a name index; each entry is
//! then exposed as an independent, seekable [`container::EntryView`] over
//! the shared source.
//!
//! ## Usage
//!
//! ```rust
//! use std::io::Read;
//! use packbox::{BoxFile, BoxWriter, Manifest};
//!
//! let mut manifest = Manifest::default();
//! manifest
//!     .mesh_paths
//!     .insert("body".into(), "file://local/body.mesh".into());
//!
//! let mut writer = BoxWriter::with_manifest(manifest.clone());
//! writer.add_entry("body.mesh", b"mesh bytes".to_vec()).unwrap();
//! writer.add_entry("notes.txt", b"hello".to_vec()).unwrap();
//! let data = writer.finalize().unwrap();
//!
//! let file = BoxFile::load(data).unwrap();
//! assert_eq!(file.manifest(), Some(manifest));
//!
//! let mut text = String::new();
//! file.resolve("notes.txt").unwrap().read_to_string(&mut text).unwrap();
//! assert_eq!(text, "hello");
//! ```
//!
//! ## Resources
//!
//! Manifests point at content with `scheme://host/path` URIs. A
//! [`resource::ResourceManager`] asks its providers in order (a loaded box,
//! a directory, or anything implementing [`resource::DataProvider`]) and
//! inflates `deflate://` resources on the fly. Mesh entries decode into
//! [`mesh::LiveMesh`].

pub mod container;
pub mod error;
pub mod manifest;
pub mod mesh;
pub mod resource;
pub mod serializer;

// Re-export main types
pub use container::{BoxFile, BoxStats, BoxWriter, ByteSource, EntryView, SharedStream};
pub use error::{BoxError, ErrorKind, ResourceError, SerializeError};
pub use manifest::Manifest;
pub use mesh::{LiveAnim, LiveMesh};
pub use resource::{DataProvider, DirectoryProvider, ResourceManager, ResourceUri};
pub use serializer::{from_bytes, to_bytes, Wire};
