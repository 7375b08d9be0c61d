// SPDX-License-Identifier: MIT
//! Content manifest stored in box headers
//!
//! The manifest maps logical content names (meshes, textures, resources,
//! translations) to resource URIs and carries per-mesh configuration. On the
//! wire every type here is a tagged composite except the composite texture
//! definitions, which are positional. The same types round-trip through JSON
//! with PascalCase keys for authoring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{wire_enum, wire_record};

/// Length of a column-major 4x4 transform
pub const TRANSFORM_LEN: usize = 16;

fn zero_transform() -> Vec<f32> {
    vec![0.0; TRANSFORM_LEN]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Manifest {
    /// Mesh name to resource URI
    pub mesh_paths: HashMap<String, String>,
    /// Texture name to resource URI
    pub texture_paths: HashMap<String, String>,
    pub resource_paths: HashMap<String, String>,
    pub translation_paths: HashMap<String, String>,
    pub mesh_configs: HashMap<String, MeshConfig>,
    /// Composite texture name to definition
    pub co_textures: HashMap<String, CoTextureDefinition>,
    pub main_mesh: Option<String>,
}

wire_record! {
    tagged nullable Manifest {
        0 => mesh_paths,
        1 => texture_paths,
        2 => resource_paths,
        3 => translation_paths,
        4 => mesh_configs,
        5 => co_textures,
        6 => main_mesh,
    }
}

impl Manifest {
    /// Example manifest with one entry of every kind, for authoring
    pub fn template() -> Self {
        let path = |name: &str| -> HashMap<String, String> {
            [(name.to_string(), "yourPath".to_string())].into()
        };

        let config = MeshConfig {
            mesh: Some("yourMeshName".into()),
            materials: vec![Material {
                textures: [(
                    "yourShaderParameterName".to_string(),
                    "yourTextureName".to_string(),
                )]
                .into(),
            }],
            custom_attach_points: vec![AttachPoint {
                bone_name: Some("yourBoneName".into()),
                ..AttachPoint::default()
            }],
            ..MeshConfig::default()
        };

        let co_texture = CoTextureDefinition {
            width: 1024,
            height: 1024,
            textures: vec![SubTextureDefinition {
                texture: Some("yourTextureName".into()),
                mask: Some("yourTextureName".into()),
            }],
        };

        Self {
            mesh_paths: path("yourMeshName"),
            texture_paths: path("yourTextureName"),
            resource_paths: path("yourResourceName"),
            translation_paths: path("yourTranslationName"),
            mesh_configs: [("yourConfigName".to_string(), config)].into(),
            co_textures: [("yourCoTextureName".to_string(), co_texture)].into(),
            main_mesh: None,
        }
    }

    /// Every URI the manifest refers to, paired with its logical name
    pub fn uris(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.mesh_paths
            .iter()
            .chain(&self.texture_paths)
            .chain(&self.resource_paths)
            .chain(&self.translation_paths)
            .map(|(name, uri)| (name.as_str(), uri.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MeshConfig {
    pub mesh: Option<String>,
    pub parent_attach_point: AttachPointType,
    /// 4x4 transform relative to the parent attach point
    pub attach_point_local_transform: Vec<f32>,
    pub custom_attach_points: Vec<AttachPoint>,
    pub materials: Vec<Material>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            mesh: None,
            parent_attach_point: AttachPointType::None,
            attach_point_local_transform: zero_transform(),
            custom_attach_points: Vec::new(),
            materials: Vec::new(),
        }
    }
}

wire_record! {
    tagged nullable MeshConfig {
        0 => mesh,
        1 => parent_attach_point,
        2 => attach_point_local_transform,
        3 => custom_attach_points,
        4 => materials,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Material {
    /// Shader parameter name to texture name
    pub textures: HashMap<String, String>,
}

wire_record! {
    tagged nullable Material {
        0 => textures,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AttachPoint {
    #[serde(rename = "Type")]
    pub kind: AttachPointType,
    pub bone_name: Option<String>,
    pub bind_pose: Vec<f32>,
}

impl Default for AttachPoint {
    fn default() -> Self {
        Self {
            kind: AttachPointType::None,
            bone_name: None,
            bind_pose: zero_transform(),
        }
    }
}

wire_record! {
    tagged nullable AttachPoint {
        0 => kind,
        1 => bone_name,
        2 => bind_pose,
    }
}

/// Texture assembled from masked layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CoTextureDefinition {
    pub width: i32,
    pub height: i32,
    pub textures: Vec<SubTextureDefinition>,
}

wire_record! {
    positional nullable CoTextureDefinition { width, height, textures }
}

/// One layer of a composite texture. Stored by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubTextureDefinition {
    pub texture: Option<String>,
    pub mask: Option<String>,
}

wire_record! {
    positional SubTextureDefinition { texture, mask }
}

wire_enum! {
    /// Skeleton locations a mesh can be attached to
    #[derive(Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum AttachPointType: i32 {
        #[default]
        None = 0,
        Helmet = 1,
        ChestPieceFront = 2,
        ChestPieceCenter = 3,
        ChestPieceBack = 4,
        ChestPieceLeft = 5,
        ChestPieceRight = 6,
        AbdomenFront = 7,
        AbdomenCenter = 8,
        AbdomenBack = 9,
        AbdomenLeft = 10,
        AbdomenRight = 11,
        LeftUpperLegFront = 12,
        LeftUpperLegCenter = 13,
        LeftUpperLegBack = 14,
        LeftUpperLegLeft = 15,
        LeftUpperLegRight = 16,
        LeftLegFront = 17,
        LeftLegCenter = 18,
        LeftLegBack = 19,
        LeftLegLeft = 20,
        LeftLegRight = 21,
        LeftFootTop = 22,
        LeftFootBottom = 23,
        LeftFootFront = 24,
        LeftFootBack = 25,
        RightUpperLegFront = 26,
        RightUpperLegCenter = 27,
        RightUpperLegBack = 28,
        RightUpperLegLeft = 29,
        RightUpperLegRight = 30,
        RightLegFront = 31,
        RightLegCenter = 32,
        RightLegBack = 33,
        RightLegLeft = 34,
        RightLegRight = 35,
        RightFootTop = 36,
        RightFootBottom = 37,
        RightFootFront = 38,
        RightFootBack = 39,
        LeftShoulder = 40,
        LeftUpperArmFront = 41,
        LeftUpperArmCenter = 42,
        LeftUpperArmBack = 43,
        LeftUpperArmOut = 44,
        LeftUpperArmIn = 45,
        LeftElbow = 46,
        LeftArmFront = 47,
        LeftArmCenter = 48,
        LeftArmBack = 49,
        LeftArmOut = 50,
        LeftArmIn = 51,
        LeftHandBack = 52,
        RightShoulder = 53,
        RightUpperArmFront = 54,
        RightUpperArmCenter = 55,
        RightUpperArmBack = 56,
        RightUpperArmOut = 57,
        RightUpperArmIn = 58,
        RightElbow = 59,
        RightArmFront = 60,
        RightArmCenter = 61,
        RightArmBack = 62,
        RightArmOut = 63,
        RightArmIn = 64,
        RightHandBack = 65,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::serializer::{from_bytes, to_bytes, BinaryWriter};

    #[test]
    fn test_template_roundtrip() {
        let manifest = Manifest::template();
        let bytes = to_bytes(&manifest).unwrap();
        assert_eq!(from_bytes::<Manifest>(&bytes).unwrap(), manifest);
    }

    #[test]
    fn test_json_uses_pascal_case() {
        let json = serde_json::to_value(Manifest::template()).unwrap();
        assert!(json.get("MeshPaths").is_some());
        assert!(json.get("CoTextures").is_some());
        let config = &json["MeshConfigs"]["yourConfigName"];
        assert_eq!(config["Mesh"], "yourMeshName");
        assert_eq!(config["CustomAttachPoints"][0]["Type"], "None");
    }

    #[test]
    fn test_json_defaults() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"MeshPaths": {"body": "file://local/body.mesh"}}"#).unwrap();
        assert_eq!(manifest.mesh_paths.len(), 1);
        assert!(manifest.texture_paths.is_empty());
        assert!(manifest.main_mesh.is_none());
    }

    #[test]
    fn test_empty_manifest_bytes() {
        let bytes = to_bytes(&Manifest::default()).unwrap();
        // presence, then six (tag, empty map) pairs, the null main mesh and the sentinel
        assert_eq!(bytes.len(), 1 + 6 * (4 + 1 + 4) + (4 + 1) + 4);
        assert_eq!(&bytes[bytes.len() - 4..], &[0xFF; 4]);
    }

    #[test]
    fn test_unknown_manifest_tag() {
        let mut w = BinaryWriter::new(Vec::new());
        w.write_presence(true).unwrap();
        w.write_tag(9).unwrap();
        w.write_sentinel().unwrap();
        let err = from_bytes::<Manifest>(&w.into_inner()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTag);
    }

    #[test]
    fn test_attach_point_discriminants() {
        assert_eq!(AttachPointType::ALL.len(), 66);
        assert_eq!(AttachPointType::RightHandBack as i32, 65);
        assert_eq!(AttachPointType::from_repr(40), Some(AttachPointType::LeftShoulder));
        assert_eq!(to_bytes(&AttachPointType::Helmet).unwrap(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_transform_defaults() {
        assert_eq!(MeshConfig::default().attach_point_local_transform.len(), TRANSFORM_LEN);
        assert_eq!(AttachPoint::default().bind_pose, vec![0.0; 16]);
    }

    #[test]
    fn test_sub_texture_is_by_value() {
        let layer = SubTextureDefinition {
            texture: Some("t".into()),
            mask: None,
        };
        assert_eq!(to_bytes(&layer).unwrap(), vec![1, b't', 0, 0]);
    }
}
