// SPDX-License-Identifier: MIT
//! Loaded box: header, offset table and entry views

use std::collections::HashMap;

use tracing::{debug, warn};

use super::header::ContainerHeader;
use super::source::ByteSource;
use super::view::EntryView;
use crate::error::BoxError;
use crate::manifest::Manifest;
use crate::serializer::Wire;

/// Location of one entry's payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub name: String,
    /// Offset relative to the first payload byte
    pub offset: u64,
    pub length: u64,
}

/// Box statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxStats {
    /// Length prefix plus compressed header
    pub header_size: u64,
    pub payload_size: u64,
    pub entry_count: usize,
    /// Size of the underlying source, trailing bytes included
    pub source_size: u64,
}

/// A box whose header has been decoded and whose entries can be resolved.
///
/// The source is kept for the lifetime of the box; every [`EntryView`]
/// borrows it and reads through explicit offsets.
pub struct BoxFile<S, M = Manifest> {
    source: S,
    manifest: Option<M>,
    locations: Vec<EntryLocation>,
    index: HashMap<String, usize>,
    base_offset: u64,
    source_size: u64,
}

impl<S: ByteSource> BoxFile<S, Manifest> {
    /// Load a box carrying the default manifest type
    pub fn load(source: S) -> Result<Self, BoxError> {
        Self::load_as(source)
    }
}

impl<S: ByteSource, M: Wire> BoxFile<S, M> {
    /// Load a box whose manifest has type `M`
    pub fn load_as(source: S) -> Result<Self, BoxError> {
        let source_size = source.size()?;
        let (header, base_offset) = ContainerHeader::<M>::read_from(&source)?;

        let mut locations = Vec::with_capacity(header.entries.len());
        let mut index = HashMap::with_capacity(header.entries.len());
        let mut offset = 0u64;
        for record in header.entries {
            let length = u64::try_from(record.length).map_err(|_| {
                warn!(name = %record.name, length = record.length, "negative entry length");
                BoxError::MalformedContainer(format!(
                    "entry {} has negative length {}",
                    record.name, record.length
                ))
            })?;
            if index.insert(record.name.clone(), locations.len()).is_some() {
                warn!(name = %record.name, "duplicate entry name");
                return Err(BoxError::MalformedContainer(format!(
                    "duplicate entry {}",
                    record.name
                )));
            }
            locations.push(EntryLocation {
                name: record.name,
                offset,
                length,
            });
            offset += length;
        }

        let required = base_offset + offset;
        if required > source_size {
            return Err(BoxError::MalformedContainer(format!(
                "entries need {} bytes but the source has {}",
                required, source_size
            )));
        }

        debug!(
            entries = locations.len(),
            base_offset,
            payload_bytes = offset,
            "loaded box"
        );
        Ok(Self {
            source,
            manifest: header.manifest,
            locations,
            index,
            base_offset,
            source_size,
        })
    }

    /// Independent copy of the manifest
    pub fn manifest(&self) -> Option<M>
    where
        M: Clone,
    {
        self.manifest.clone()
    }

    pub fn manifest_ref(&self) -> Option<&M> {
        self.manifest.as_ref()
    }

    /// View over the named entry, or `None` if the box has no such entry
    pub fn resolve(&self, name: &str) -> Option<EntryView<'_, S>> {
        let &i = self.index.get(name)?;
        Some(self.view(&self.locations[i]))
    }

    /// Every entry in declared order, each with a fresh view
    pub fn entries(&self) -> impl Iterator<Item = (&str, EntryView<'_, S>)> + '_ {
        self.locations
            .iter()
            .map(move |loc| (loc.name.as_str(), self.view(loc)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.locations.iter().map(|loc| loc.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &[EntryLocation] {
        &self.locations
    }

    /// Absolute offset of the first payload byte
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn stats(&self) -> BoxStats {
        BoxStats {
            header_size: self.base_offset,
            payload_size: self.locations.iter().map(|l| l.length).sum(),
            entry_count: self.locations.len(),
            source_size: self.source_size,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn view(&self, loc: &EntryLocation) -> EntryView<'_, S> {
        EntryView::new(&self.source, self.base_offset + loc.offset, loc.length)
    }
}

impl<S, M> std::fmt::Debug for BoxFile<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxFile")
            .field("entries", &self.locations.len())
            .field("base_offset", &self.base_offset)
            .field("has_manifest", &self.manifest.is_some())
            .finish()
    }
}
