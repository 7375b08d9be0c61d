// SPDX-License-Identifier: MIT
//! Basic usage example for Packbox

use packbox::manifest::{AttachPointType, MeshConfig};
use packbox::{BoxFile, BoxWriter, DirectoryProvider, Manifest, ResourceManager};
use std::io::Read;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Packbox - Basic Usage ===\n");

    // Step 1: Describe the content
    println!("1. Building manifest...");
    let mut manifest = Manifest::default();
    manifest
        .mesh_paths
        .insert("body".into(), "file://local/body.mesh".into());
    manifest
        .texture_paths
        .insert("skin".into(), "file://local/skin.png".into());
    manifest
        .resource_paths
        .insert("readme".into(), "file://local/readme.txt".into());
    manifest.mesh_configs.insert(
        "body".into(),
        MeshConfig {
            mesh: Some("body".into()),
            parent_attach_point: AttachPointType::Helmet,
            ..MeshConfig::default()
        },
    );
    manifest.main_mesh = Some("body".into());
    println!("   {} URIs referenced", manifest.uris().count());

    // Step 2: Pack entries
    println!("\n2. Packing box...");
    let mut writer = BoxWriter::with_manifest(manifest);
    writer.add_entry("body.mesh", vec![0x42; 2048])?;
    writer.add_entry("skin.png", b"\x89PNG not really".to_vec())?;
    let data = writer.finalize()?;
    println!("   Box created: {} bytes", data.len());

    // Step 3: Write to file and load it back
    println!("\n3. Writing to file...");
    let dir = std::env::temp_dir().join("packbox_demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("demo.box");
    std::fs::write(&path, &data)?;
    std::fs::write(dir.join("readme.txt"), b"loose file next to the box")?;
    println!("   Written to: {}", path.display());

    println!("\n4. Loading box...");
    let file = BoxFile::load(std::fs::File::open(&path)?)?;
    let stats = file.stats();
    println!("   Entries: {}", stats.entry_count);
    println!("   Header size: {} bytes", stats.header_size);
    println!("   Payload size: {} bytes", stats.payload_size);
    for location in file.locations() {
        println!(
            "   - {} @ {} ({} bytes)",
            location.name, location.offset, location.length
        );
    }

    // Step 5: Resolve through the manifest
    println!("\n5. Resolving resources...");
    let directory = DirectoryProvider::new(&dir);
    let mut resources = ResourceManager::new();
    resources.register(&file).register(&directory);

    if let Some(manifest) = file.manifest_ref() {
        for (name, uri) in manifest.uris() {
            let mut stream = resources.open(uri)?;
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf)?;
            println!("   {name} -> {uri}: {} bytes", buf.len());
        }
    }

    std::fs::remove_dir_all(&dir)?;
    println!("\n=== Done ===");
    Ok(())
}
