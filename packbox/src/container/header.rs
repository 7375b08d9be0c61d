// SPDX-License-Identifier: MIT
//! Compressed container header
//!
//! ```text
//! [length prefix][raw DEFLATE(header)]
//!
//! header = manifest:  [presence] manifest body
//!          entries:   [presence] i32 count, (name text, length i32)*
//! ```

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use tracing::debug;

use super::source::ByteSource;
use super::varint::{read_length, write_length, MAX_LENGTH_PREFIX};
use crate::error::{BoxError, SerializeError};
use crate::serializer::{write_slice, BinaryReader, BinaryWriter, Shape, Wire};
use crate::wire_record;

/// Largest decompressed header accepted when loading
pub const MAX_HEADER_SIZE: u64 = 16 * 1024 * 1024;

/// Name and payload length of one entry, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryRecord {
    pub name: String,
    pub length: i32,
}

impl EntryRecord {
    pub fn new(name: impl Into<String>, length: i32) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

wire_record! {
    positional EntryRecord { name, length }
}

/// Decoded container header: the optional manifest plus the entry table
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerHeader<M> {
    pub manifest: Option<M>,
    pub entries: Vec<EntryRecord>,
}

impl<M: Wire> Wire for ContainerHeader<M> {
    fn write_body<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<(), SerializeError> {
        write_fields(w, self.manifest.as_ref(), &self.entries)
    }

    fn read_body<R: std::io::BufRead>(r: &mut BinaryReader<R>) -> Result<Self, SerializeError> {
        let manifest = Option::<M>::read(r)?;
        let entries = Vec::<EntryRecord>::read(r)?;
        Ok(Self { manifest, entries })
    }

    fn shape() -> Shape {
        Shape::Composite(Box::new(crate::serializer::CompositeShape {
            name: "ContainerHeader".to_string(),
            strategy: crate::serializer::Strategy::Positional,
            nullable: false,
            members: vec![
                crate::serializer::Member::positional("manifest", Option::<M>::shape()),
                crate::serializer::Member::positional("entries", Vec::<EntryRecord>::shape()),
            ],
        }))
    }
}

fn write_fields<M: Wire, W: Write>(
    w: &mut BinaryWriter<W>,
    manifest: Option<&M>,
    entries: &[EntryRecord],
) -> Result<(), SerializeError> {
    match manifest {
        Some(m) => {
            w.write_presence(true)?;
            m.write_body(w)?;
        }
        None => w.write_presence(false)?,
    }
    write_slice(entries, w)
}

/// Write the length prefix and compressed header.
///
/// Returns the number of bytes written, which is where the first payload
/// starts. The caller appends payloads in entry order.
pub fn write_head<M: Wire, W: Write>(
    w: &mut W,
    manifest: Option<&M>,
    entries: &[EntryRecord],
    level: Compression,
) -> Result<u64, BoxError> {
    let mut plain = BinaryWriter::new(Vec::new());
    write_fields(&mut plain, manifest, entries).map_err(BoxError::Header)?;
    let plain = plain.into_inner();

    let mut encoder = DeflateEncoder::new(Vec::with_capacity(plain.len() / 2 + 64), level);
    encoder.write_all(&plain)?;
    let compressed = encoder.finish()?;

    let prefix = write_length(w, compressed.len() as u64)?;
    w.write_all(&compressed)?;

    debug!(
        entries = entries.len(),
        header_bytes = plain.len(),
        compressed_bytes = compressed.len(),
        "wrote container header"
    );
    Ok((prefix + compressed.len()) as u64)
}

impl<M: Wire> ContainerHeader<M> {
    pub fn new(manifest: Option<M>, entries: Vec<EntryRecord>) -> Self {
        Self { manifest, entries }
    }

    pub fn write_to<W: Write>(&self, w: &mut W, level: Compression) -> Result<u64, BoxError> {
        write_head(w, self.manifest.as_ref(), &self.entries, level)
    }

    /// Load and decode the header at the start of `source`.
    ///
    /// Returns the header and the base offset of the first payload.
    pub fn read_from<S: ByteSource + ?Sized>(source: &S) -> Result<(Self, u64), BoxError> {
        Self::read_from_with_limit(source, MAX_HEADER_SIZE)
    }

    /// [`read_from`](Self::read_from) with an explicit cap on the inflated
    /// header size
    pub fn read_from_with_limit<S: ByteSource + ?Sized>(
        source: &S,
        limit: u64,
    ) -> Result<(Self, u64), BoxError> {
        let size = source.size()?;

        let mut prefix = [0u8; MAX_LENGTH_PREFIX];
        let available = usize::try_from(size.min(MAX_LENGTH_PREFIX as u64)).unwrap_or(0);
        source.read_exact_at(0, &mut prefix[..available])?;
        let (compressed_len, prefix_len) = read_length(&prefix[..available])?;

        let base = (prefix_len as u64)
            .checked_add(compressed_len)
            .ok_or_else(|| BoxError::MalformedContainer("header length overflows".into()))?;
        if base > size {
            return Err(BoxError::TruncatedInput {
                expected: base,
                available: size,
            });
        }

        // Bounded by the source size checked above
        let mut compressed = vec![0u8; compressed_len as usize];
        source.read_exact_at(prefix_len as u64, &mut compressed)?;

        let mut plain = Vec::new();
        DeflateDecoder::new(compressed.as_slice())
            .take(limit.saturating_add(1))
            .read_to_end(&mut plain)
            .map_err(|e| BoxError::MalformedContainer(format!("header decompression failed: {e}")))?;
        if plain.len() as u64 > limit {
            return Err(BoxError::MalformedContainer(format!(
                "header inflates past {limit} bytes"
            )));
        }

        let mut reader = BinaryReader::new(plain.as_slice());
        let header = Self::read(&mut reader).map_err(BoxError::Header)?;

        debug!(
            compressed_bytes = compressed_len,
            header_bytes = plain.len(),
            entries = header.entries.len(),
            base_offset = base,
            "read container header"
        );
        Ok((header, base))
    }
}

/// Default header compression
pub fn default_compression() -> Compression {
    Compression::best()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::serializer::to_bytes;

    fn entries() -> Vec<EntryRecord> {
        vec![EntryRecord::new("a.bin", 3), EntryRecord::new("b.bin", 0)]
    }

    #[test]
    fn test_entry_record_is_by_value() {
        let bytes = to_bytes(&EntryRecord::new("a", 7)).unwrap();
        assert_eq!(bytes, vec![1, b'a', 0, 7, 0, 0, 0]);
    }

    #[test]
    fn test_header_without_manifest() {
        let header = ContainerHeader::<String>::new(None, entries());
        let bytes = to_bytes(&header).unwrap();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[2..6], &2i32.to_le_bytes());
    }

    #[test]
    fn test_write_then_read() {
        let header = ContainerHeader::new(Some("manifest".to_string()), entries());
        let mut out = Vec::new();
        let base = header.write_to(&mut out, default_compression()).unwrap();
        assert_eq!(base, out.len() as u64);

        let (decoded, decoded_base) = ContainerHeader::<String>::read_from(out.as_slice()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded_base, base);
    }

    #[test]
    fn test_truncated_header() {
        let header = ContainerHeader::<String>::new(None, entries());
        let mut out = Vec::new();
        header.write_to(&mut out, Compression::fast()).unwrap();
        out.truncate(out.len() - 1);

        let err = ContainerHeader::<String>::read_from(out.as_slice()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_empty_source() {
        let err = ContainerHeader::<String>::read_from(&[0u8; 0][..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    fn inflating_header(plain_len: usize) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&vec![0u8; plain_len]).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut data = Vec::new();
        write_length(&mut data, compressed.len() as u64).unwrap();
        data.extend_from_slice(&compressed);
        data
    }

    #[test]
    fn test_inflation_is_bounded() {
        let data = inflating_header(64 * 1024);
        assert!(data.len() < 1024);

        let err =
            ContainerHeader::<String>::read_from_with_limit(data.as_slice(), 4096).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
        assert!(err.to_string().contains("inflates past 4096 bytes"));
    }

    #[test]
    fn test_default_limit_rejects_oversized_header() {
        let data = inflating_header(MAX_HEADER_SIZE as usize + 1);
        let err = ContainerHeader::<String>::read_from(data.as_slice()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
    }

    #[test]
    fn test_header_at_limit_is_read() {
        let header = ContainerHeader::<String>::new(None, entries());
        let plain_len = to_bytes(&header).unwrap().len() as u64;
        let mut out = Vec::new();
        header.write_to(&mut out, Compression::fast()).unwrap();

        let (decoded, _) =
            ContainerHeader::<String>::read_from_with_limit(out.as_slice(), plain_len).unwrap();
        assert_eq!(decoded, header);
        let short = ContainerHeader::<String>::read_from_with_limit(out.as_slice(), plain_len - 1);
        assert!(short.is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let mut data = Vec::new();
        write_length(&mut data, 4).unwrap();
        data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        let err = ContainerHeader::<String>::read_from(data.as_slice()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
    }
}
