// SPDX-License-Identifier: MIT
//! Property-based tests using proptest
//!
//! Round-trips for typed and dynamic values, equivalence of the bulk and
//! per-element sequence encodings, tag order independence, the length
//! prefix and view boundary behaviour.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek, SeekFrom};

use proptest::prelude::*;

use packbox::container::varint::{encode_length, read_length};
use packbox::container::EntryView;
use packbox::manifest::{CoTextureDefinition, Material, MeshConfig, SubTextureDefinition};
use packbox::serializer::{
    decode_from_slice, encode_to_vec, from_bytes, to_bytes, BinaryWriter, CompositeShape, Member,
    Shape, Strategy as WireStrategy, Value, Wire,
};
use packbox::{BoxFile, BoxWriter, Manifest};

/// Strategy for text, including multi-byte characters but no NUL
fn text_strategy() -> impl Strategy<Value = String> {
    "[^\\x00]{0,24}"
}

fn string_map_strategy() -> impl Strategy<Value = HashMap<String, String>> {
    prop::collection::hash_map(text_strategy(), text_strategy(), 0..6)
}

fn manifest_strategy() -> impl Strategy<Value = Manifest> {
    (
        string_map_strategy(),
        string_map_strategy(),
        string_map_strategy(),
        prop::collection::hash_map(text_strategy(), string_map_strategy(), 0..3),
        prop::option::of(text_strategy()),
        prop::collection::vec(
            (prop::option::of(text_strategy()), prop::option::of(text_strategy())),
            0..4,
        ),
    )
        .prop_map(|(meshes, textures, resources, materials, main, layers)| {
            let mut manifest = Manifest {
                mesh_paths: meshes,
                texture_paths: textures,
                resource_paths: resources,
                main_mesh: main,
                ..Manifest::default()
            };
            manifest.co_textures.insert(
                "co".into(),
                CoTextureDefinition {
                    width: 256,
                    height: 128,
                    textures: layers
                        .into_iter()
                        .map(|(texture, mask)| SubTextureDefinition { texture, mask })
                        .collect(),
                },
            );
            let config = MeshConfig {
                materials: materials
                    .into_values()
                    .map(|textures| Material { textures })
                    .collect(),
                ..MeshConfig::default()
            };
            manifest.mesh_configs.insert("main".into(), config);
            manifest
        })
}

/// Per-element reference encoding of a numeric sequence
fn naive_sequence<T: Wire>(items: &[T]) -> Vec<u8> {
    let mut w = BinaryWriter::new(Vec::new());
    w.write_presence(true).unwrap();
    w.write_count(items.len(), "sequence").unwrap();
    for item in items {
        item.write_body(&mut w).unwrap();
    }
    w.into_inner()
}

fn leaf_value() -> impl Strategy<Value = (Value, Shape)> {
    prop_oneof![
        any::<i8>().prop_map(|v| (Value::I8(v), Shape::I8)),
        any::<u16>().prop_map(|v| (Value::U16(v), Shape::U16)),
        any::<i32>().prop_map(|v| (Value::I32(v), Shape::I32)),
        any::<u64>().prop_map(|v| (Value::U64(v), Shape::U64)),
        any::<f64>()
            .prop_filter("NaN never compares equal", |v| !v.is_nan())
            .prop_map(|v| (Value::F64(v), Shape::F64)),
        text_strategy().prop_map(|s| (Value::Text(s), Shape::Text)),
        Just((Value::Null, Shape::Text)),
    ]
}

fn composite_of(fields: Vec<(Value, Shape)>, strategy: WireStrategy) -> (Value, Shape) {
    let mut values = Vec::new();
    let mut members = Vec::new();
    for (i, (value, shape)) in fields.into_iter().enumerate() {
        let name = format!("m{i}");
        members.push(match strategy {
            WireStrategy::Positional => Member::positional(name.clone(), shape),
            WireStrategy::Tagged => Member::tagged(name.clone(), i as i32, shape),
        });
        values.push((name, value));
    }
    let shape = Shape::Composite(Box::new(CompositeShape {
        name: "Generated".into(),
        strategy,
        nullable: true,
        members,
    }));
    (Value::Composite(values), shape)
}

fn nested_value() -> impl Strategy<Value = (Value, Shape)> {
    leaf_value().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(any::<i32>(), 0..8).prop_map(|items| (
                Value::Sequence(items.into_iter().map(Value::I32).collect()),
                Shape::Sequence(Box::new(Shape::I32)),
            )),
            prop::collection::btree_set(text_strategy(), 0..4).prop_map(|keys| (
                Value::Mapping(
                    keys.into_iter()
                        .map(|k| (Value::Text(k), Value::I32(1)))
                        .collect()
                ),
                Shape::Mapping(Box::new(Shape::Text), Box::new(Shape::I32)),
            )),
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|fields| composite_of(fields, WireStrategy::Positional)),
            prop::collection::vec(inner, 0..4)
                .prop_map(|fields| composite_of(fields, WireStrategy::Tagged)),
        ]
    })
}

proptest! {
    /// Manifests survive an encode/decode cycle unchanged
    #[test]
    fn manifest_round_trip(manifest in manifest_strategy()) {
        let bytes = to_bytes(&manifest).unwrap();
        prop_assert_eq!(from_bytes::<Manifest>(&bytes).unwrap(), manifest);
    }

    /// Dynamic values survive an encode/decode cycle against their shape
    #[test]
    fn value_round_trip((value, shape) in nested_value()) {
        let bytes = encode_to_vec(&value, &shape).unwrap();
        prop_assert_eq!(decode_from_slice(&shape, &bytes).unwrap(), value);
    }

    /// Bulk sequence encoding matches the per-element reference
    #[test]
    fn bulk_matches_naive(
        ints in prop::collection::vec(any::<i64>(), 0..64),
        floats in prop::collection::vec(any::<f32>(), 0..64),
        bytes in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assert_eq!(to_bytes(&ints).unwrap(), naive_sequence(&ints));
        prop_assert_eq!(to_bytes(&floats).unwrap(), naive_sequence(&floats));
        prop_assert_eq!(to_bytes(&bytes).unwrap(), naive_sequence(&bytes));
    }

    /// Ordered and hashed maps round-trip with the same content
    #[test]
    fn maps_round_trip(map in prop::collection::btree_map(any::<i32>(), text_strategy(), 0..16)) {
        let bytes = to_bytes(&map).unwrap();
        prop_assert_eq!(from_bytes::<BTreeMap<i32, String>>(&bytes).unwrap(), map.clone());

        let hashed: HashMap<i32, String> = map.into_iter().collect();
        let bytes = to_bytes(&hashed).unwrap();
        prop_assert_eq!(from_bytes::<HashMap<i32, String>>(&bytes).unwrap(), hashed);
    }

    /// Tagged members decode the same in any wire order
    #[test]
    fn tag_order_independent(
        values in prop::collection::vec(any::<i32>(), 1..8),
        seed in any::<u64>(),
    ) {
        let members: Vec<Member> = (0..values.len())
            .map(|i| Member::tagged(format!("m{i}"), i as i32 * 3, Shape::I32))
            .collect();
        let shape = Shape::Composite(Box::new(CompositeShape {
            name: "Shuffled".into(),
            strategy: WireStrategy::Tagged,
            nullable: false,
            members,
        }));

        let mut order: Vec<usize> = (0..values.len()).collect();
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            order.swap(i, (state >> 33) as usize % (i + 1));
        }

        let mut w = BinaryWriter::new(Vec::new());
        for &i in &order {
            w.write_tag(i as i32 * 3).unwrap();
            w.write_i32(values[i]).unwrap();
        }
        w.write_sentinel().unwrap();

        let expected = Value::Composite(
            values.iter().enumerate().map(|(i, &v)| (format!("m{i}"), Value::I32(v))).collect(),
        );
        prop_assert_eq!(decode_from_slice(&shape, &w.into_inner()).unwrap(), expected);
    }

    /// The length prefix round-trips and ends on the only byte with bit 7 set
    #[test]
    fn length_prefix_round_trip(value in any::<u64>()) {
        let (buf, len) = encode_length(value);
        let bytes = &buf[..len];
        prop_assert_eq!(read_length(bytes).unwrap(), (value, len));
        prop_assert!(bytes[len - 1] & 0x80 != 0);
        prop_assert!(bytes[..len - 1].iter().all(|b| b & 0x80 == 0));
    }

    /// Reads through a view never leave the view's range
    #[test]
    fn view_reads_are_clamped(
        data in prop::collection::vec(any::<u8>(), 1..256),
        start_frac in 0.0f64..1.0,
        len_frac in 0.0f64..1.0,
        seek in 0u64..512,
        want in 0usize..512,
    ) {
        let start = (data.len() as f64 * start_frac) as usize;
        let len = ((data.len() - start) as f64 * len_frac) as usize;
        let mut view = EntryView::new(data.as_slice(), start as u64, len as u64);

        view.seek(SeekFrom::Start(seek)).unwrap();
        let mut buf = vec![0u8; want];
        let n = view.read(&mut buf).unwrap();

        let expected_n = want.min(len.saturating_sub(seek as usize));
        prop_assert_eq!(n, expected_n);
        if n > 0 {
            let from = start + seek as usize;
            prop_assert_eq!(&buf[..n], &data[from..from + n]);
        }
    }

    /// Any set of uniquely named payloads comes back byte for byte
    #[test]
    fn box_round_trip(
        entries in prop::collection::btree_map(
            "[a-z]{1,8}\\.bin",
            prop::collection::vec(any::<u8>(), 0..64),
            0..8,
        ),
    ) {
        let mut writer = BoxWriter::new();
        for (name, payload) in &entries {
            writer.add_entry(name.clone(), payload.clone()).unwrap();
        }
        let file = BoxFile::load(writer.finalize().unwrap()).unwrap();

        prop_assert_eq!(file.len(), entries.len());
        for ((name, view), (expected_name, expected)) in file.entries().zip(&entries) {
            prop_assert_eq!(name, expected_name.as_str());
            prop_assert_eq!(&view.to_vec().unwrap(), expected);
        }
    }
}
