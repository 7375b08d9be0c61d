// SPDX-License-Identifier: MIT
//! Resolving manifest URIs against a box and its directory

use std::io::{Read, Write};

use flate2::write::DeflateEncoder;
use flate2::Compression;
use packbox::{BoxFile, BoxWriter, DirectoryProvider, ErrorKind, Manifest, ResourceManager};

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::best());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

#[test]
fn test_box_then_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("loose.txt"), b"from disk").unwrap();
    std::fs::write(dir.path().join("shadowed.txt"), b"disk copy").unwrap();

    let mut manifest = Manifest::default();
    manifest
        .resource_paths
        .insert("packed".into(), "file://local/packed.txt".into());
    manifest
        .resource_paths
        .insert("loose".into(), "file://local/loose.txt".into());
    manifest
        .translation_paths
        .insert("en".into(), "deflate://local/en.lang".into());

    let mut writer = BoxWriter::with_manifest(manifest);
    writer.add_entry("packed.txt", b"from box".to_vec()).unwrap();
    writer.add_entry("shadowed.txt", b"box copy".to_vec()).unwrap();
    writer
        .add_entry("en.lang", deflate(b"hello=Hello"))
        .unwrap();
    let file = BoxFile::load(writer.finalize().unwrap()).unwrap();

    let directory = DirectoryProvider::new(dir.path());
    let mut resources = ResourceManager::new();
    resources.register(&file).register(&directory);

    let manifest = file.manifest_ref().unwrap();
    let lookup = |uri: &str| resources.read_to_vec(uri).unwrap();

    assert_eq!(lookup(&manifest.resource_paths["packed"]), b"from box");
    assert_eq!(lookup(&manifest.resource_paths["loose"]), b"from disk");
    assert_eq!(lookup(&manifest.translation_paths["en"]), b"hello=Hello");
    assert_eq!(lookup("file://local/shadowed.txt"), b"box copy");
}

#[test]
fn test_box_streams_are_views() {
    let mut writer = BoxWriter::new();
    writer.add_entry("blob", (0u8..=255).collect()).unwrap();
    let file = BoxFile::load(writer.finalize().unwrap()).unwrap();

    let mut resources = ResourceManager::new();
    resources.register(&file);

    let mut stream = resources.open("file://LOCAL/blob").unwrap();
    let mut head = [0u8; 4];
    stream.read_exact(&mut head).unwrap();
    assert_eq!(head, [0, 1, 2, 3]);
}

#[test]
fn test_missing_resource() {
    let file = BoxFile::load(BoxWriter::new().finalize().unwrap()).unwrap();
    let mut resources = ResourceManager::new();
    resources.register(&file);

    let err = resources.open("file://local/absent").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = resources.open("not a uri").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}
