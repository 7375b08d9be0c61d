//! Implementations of the `packbox` subcommands
//!
//! Each command takes the loaded [`Config`] and plain paths so it can be
//! driven from tests without going through argument parsing.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use packbox::container::{write_head, EntryRecord};
use packbox::{serializer, BoxError, BoxFile, DirectoryProvider, Manifest, ResourceManager};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::Config;

const BUFFER_SIZE: usize = 64 * 1024;

/// Write `target` through a temporary file in the same directory.
///
/// The target only appears once `write` has succeeded.
fn write_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    {
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, tmp.as_file());
        write(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {:?}", target))?;
    }

    tmp.persist(target)
        .with_context(|| format!("Failed to move output into place: {:?}", target))?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid JSON in {:?}", path))
}

fn open_box(path: &Path) -> Result<BoxFile<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open box {:?}", path))?;
    BoxFile::load(file).with_context(|| format!("Failed to load box {:?}", path))
}

/// Reject entry names that would escape the unpack directory
fn checked_entry_name(name: &str) -> Result<&str, BoxError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(BoxError::MalformedContainer(format!(
            "entry name {:?} is not a plain file name",
            name
        )));
    }
    Ok(name)
}

/// Pack `resources` (and an optional JSON manifest) into a box at `target`.
///
/// Entry names are the resource file names. Payloads are streamed from disk
/// after the header, so nothing is held in memory beyond one buffer.
pub fn pack(
    config: &Config,
    target: &Path,
    resources: &[PathBuf],
    manifest: Option<&Path>,
) -> Result<()> {
    let manifest: Option<Manifest> = manifest.map(read_json).transpose()?;

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(resources.len());
    for path in resources {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Resource has no usable file name: {:?}", path))?;
        if !seen.insert(name) {
            return Err(BoxError::DuplicateEntry(name.to_string()))
                .with_context(|| format!("Failed to add {:?}", path));
        }

        let length = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata of {:?}", path))?
            .len();
        let length = i32::try_from(length).map_err(|_| BoxError::EntryTooLarge {
            name: name.to_string(),
            length,
        })?;
        records.push(EntryRecord::new(name, length));
    }

    write_atomically(target, |w| {
        let header_size = write_head(
            w,
            manifest.as_ref(),
            &records,
            Compression::new(config.compression_level),
        )?;
        debug!(header_size, "header written");

        for (path, record) in resources.iter().zip(&records) {
            let mut file =
                File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
            let copied = io::copy(&mut file, w)
                .with_context(|| format!("Failed to copy {:?}", path))?;
            if copied != record.length as u64 {
                bail!(
                    "{:?} changed while packing: expected {} bytes, copied {}",
                    path,
                    record.length,
                    copied
                );
            }
        }
        Ok(())
    })?;

    info!(target = ?target, entries = records.len(), "packed box");
    Ok(())
}

/// Extract the manifest (as JSON) and every entry of `source` into `target_dir`.
///
/// Every entry name is checked before anything is written.
pub fn unpack(config: &Config, source: &Path, target_dir: &Path) -> Result<()> {
    let file = open_box(source)?;
    for name in file.names() {
        checked_entry_name(name).with_context(|| format!("Refusing to unpack {:?}", source))?;
    }

    fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", target_dir))?;

    if let Some(manifest) = file.manifest_ref() {
        let path = target_dir.join(&config.manifest_file_name);
        let out = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
        let mut out = BufWriter::new(out);
        serde_json::to_writer_pretty(&mut out, manifest)
            .with_context(|| format!("Failed to write manifest {:?}", path))?;
        out.flush()?;
    }

    for (name, mut view) in file.entries() {
        let path = target_dir.join(name);
        let mut out = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
        io::copy(&mut view, &mut out).with_context(|| format!("Failed to extract {:?}", path))?;
    }

    info!(source = ?source, entries = file.len(), "unpacked box");
    Ok(())
}

fn sha256_hex(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Print one line per entry (name, offset, length, SHA-256) and the box totals
pub fn list(source: &Path, out: &mut impl Write) -> Result<()> {
    let file = open_box(source)?;

    for location in file.locations() {
        let hash = match file.resolve(&location.name) {
            Some(view) => sha256_hex(view)
                .with_context(|| format!("Failed to read entry {:?}", location.name))?,
            None => bail!("entry {:?} vanished from the index", location.name),
        };
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            location.name, location.offset, location.length, hash
        )?;
    }

    let stats = file.stats();
    writeln!(
        out,
        "{} entries, header {} bytes, payload {} bytes, manifest: {}",
        stats.entry_count,
        stats.header_size,
        stats.payload_size,
        if file.manifest_ref().is_some() { "yes" } else { "no" }
    )?;
    Ok(())
}

/// Copy the resource `uri` to `out`, looking in the box first and then in
/// the directory holding it
pub fn cat(source: &Path, uri: &str, out: &mut impl Write) -> Result<u64> {
    let file = open_box(source)?;
    let dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let directory = DirectoryProvider::new(dir);

    let mut resources = ResourceManager::new();
    resources.register(&file).register(&directory);

    let mut stream = resources
        .open(uri)
        .with_context(|| format!("Failed to resolve {} from {:?}", uri, source))?;
    let copied = io::copy(&mut stream, out).with_context(|| format!("Failed to read {}", uri))?;
    Ok(copied)
}

/// Write a manifest template to fill in by hand
pub fn template(target: &Path) -> Result<()> {
    write_atomically(target, |w| {
        serde_json::to_writer_pretty(&mut *w, &Manifest::template())
            .with_context(|| format!("Failed to write template {:?}", target))?;
        w.write_all(b"\n")?;
        Ok(())
    })
}

/// Serialize a JSON string map (for example a translation table) into its
/// binary form, optionally as raw DEFLATE for `deflate://` URIs
pub fn make_map(config: &Config, source: &Path, target: &Path, compress: bool) -> Result<()> {
    let map: HashMap<String, String> = read_json(source)?;

    write_atomically(target, |w| {
        if compress {
            let mut encoder =
                DeflateEncoder::new(&mut *w, Compression::new(config.compression_level));
            serializer::write_to(&map, &mut encoder)?;
            encoder.finish()?;
        } else {
            serializer::write_to(&map, &mut *w)?;
        }
        Ok(())
    })?;

    info!(target = ?target, keys = map.len(), compress, "wrote map");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_entry_name() {
        assert!(checked_entry_name("mesh.bin").is_ok());
        assert!(checked_entry_name("a.b.c").is_ok());

        for name in ["", "../up", "a/b", "a\\b", ".."] {
            let err = checked_entry_name(name).unwrap_err();
            assert!(matches!(err, BoxError::MalformedContainer(_)), "{name:?}");
        }
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(&b"abc"[..]).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_write_atomically_leaves_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.box");

        let result = write_atomically(&target, |w| {
            w.write_all(b"partial")?;
            bail!("stop")
        });
        assert!(result.is_err());
        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        write_atomically(&target, |w| Ok(w.write_all(b"done")?)).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"done");
    }
}
