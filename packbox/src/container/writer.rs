// SPDX-License-Identifier: MIT
//! Builder for box files

use std::collections::HashSet;
use std::io::Write;

use flate2::Compression;
use tracing::debug;

use super::header::{default_compression, write_head, EntryRecord};
use crate::error::BoxError;
use crate::manifest::Manifest;
use crate::serializer::Wire;

/// Collects named payloads and an optional manifest, then writes a box.
///
/// Entries keep the order in which they were added; that order is the
/// payload order on disk and the enumeration order after loading.
pub struct BoxWriter<M = Manifest> {
    manifest: Option<M>,
    records: Vec<EntryRecord>,
    payloads: Vec<Vec<u8>>,
    names: HashSet<String>,
    compression: Compression,
}

impl BoxWriter<Manifest> {
    /// Create a writer for the default manifest type, initially without a manifest
    pub fn new() -> Self {
        Self::without_manifest()
    }
}

impl Default for BoxWriter<Manifest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Wire> BoxWriter<M> {
    pub fn with_manifest(manifest: M) -> Self {
        Self {
            manifest: Some(manifest),
            ..Self::without_manifest()
        }
    }

    pub fn without_manifest() -> Self {
        Self {
            manifest: None,
            records: Vec::new(),
            payloads: Vec::new(),
            names: HashSet::new(),
            compression: default_compression(),
        }
    }

    /// Set the header compression level (0-9)
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    pub fn set_manifest(&mut self, manifest: Option<M>) {
        self.manifest = manifest;
    }

    pub fn manifest(&self) -> Option<&M> {
        self.manifest.as_ref()
    }

    /// Add an entry; names must be unique and payloads fit in an `i32` length
    pub fn add_entry(&mut self, name: impl Into<String>, payload: Vec<u8>) -> Result<(), BoxError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(BoxError::DuplicateEntry(name));
        }
        let length = i32::try_from(payload.len()).map_err(|_| BoxError::EntryTooLarge {
            name: name.clone(),
            length: payload.len() as u64,
        })?;

        self.names.insert(name.clone());
        self.records.push(EntryRecord::new(name, length));
        self.payloads.push(payload);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write header and payloads; returns the total number of bytes written
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64, BoxError> {
        let mut written = write_head(w, self.manifest.as_ref(), &self.records, self.compression)?;
        for payload in &self.payloads {
            w.write_all(payload)?;
            written += payload.len() as u64;
        }
        w.flush()?;

        debug!(
            entries = self.records.len(),
            total_bytes = written,
            "wrote box"
        );
        Ok(written)
    }

    /// Write the whole box into memory
    pub fn finalize(self) -> Result<Vec<u8>, BoxError> {
        let payload_bytes: usize = self.payloads.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(payload_bytes + 256);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::varint::read_length;

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut writer = BoxWriter::new();
        writer.add_entry("a.bin", vec![1, 2]).unwrap();
        let err = writer.add_entry("a.bin", vec![3]).unwrap_err();
        assert!(matches!(err, BoxError::DuplicateEntry(name) if name == "a.bin"));
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_payloads_follow_header() {
        let mut writer = BoxWriter::new();
        writer.add_entry("a", b"xyz".to_vec()).unwrap();
        writer.add_entry("b", b"12".to_vec()).unwrap();
        let data = writer.finalize().unwrap();

        let (compressed_len, prefix_len) = read_length(&data).unwrap();
        let base = prefix_len + compressed_len as usize;
        assert_eq!(&data[base..], b"xyz12");
    }

    #[test]
    fn test_empty_writer() {
        let writer = BoxWriter::new();
        assert!(writer.is_empty());
        let data = writer.finalize().unwrap();
        assert!(!data.is_empty());
    }

    #[test]
    fn test_custom_manifest_type() {
        let writer = BoxWriter::with_manifest("notes".to_string()).with_compression_level(1);
        assert_eq!(writer.manifest().map(String::as_str), Some("notes"));
        assert!(writer.finalize().is_ok());
    }
}
