// SPDX-License-Identifier: MIT
//! Skinned mesh and skeletal animation payloads
//!
//! These are the records stored as box entries for the URIs in
//! [`Manifest::mesh_paths`](crate::Manifest::mesh_paths). Meshes, sub-meshes,
//! animations and bones are tagged composites. The small math types and
//! [`BoneWeight`] are positional and carried by value, with no presence
//! byte, so a `Vec<Vector3>` is just its count followed by 12 bytes per
//! vertex.

use serde::{Deserialize, Serialize};

use crate::manifest::AttachPoint;
use crate::{wire_enum, wire_record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

wire_record! {
    positional Vector2 { x, y }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

wire_record! {
    positional Vector3 { x, y, z }
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Row-major 4x4 transform, `mRC` being row `R` column `C`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Matrix4x4 {
    pub m11: f32,
    pub m12: f32,
    pub m13: f32,
    pub m14: f32,
    pub m21: f32,
    pub m22: f32,
    pub m23: f32,
    pub m24: f32,
    pub m31: f32,
    pub m32: f32,
    pub m33: f32,
    pub m34: f32,
    pub m41: f32,
    pub m42: f32,
    pub m43: f32,
    pub m44: f32,
}

wire_record! {
    positional Matrix4x4 {
        m11, m12, m13, m14,
        m21, m22, m23, m24,
        m31, m32, m33, m34,
        m41, m42, m43, m44,
    }
}

impl Matrix4x4 {
    pub const IDENTITY: Self = Self::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self {
            m11: rows[0][0],
            m12: rows[0][1],
            m13: rows[0][2],
            m14: rows[0][3],
            m21: rows[1][0],
            m22: rows[1][1],
            m23: rows[1][2],
            m24: rows[1][3],
            m31: rows[2][0],
            m32: rows[2][1],
            m33: rows[2][2],
            m34: rows[2][3],
            m41: rows[3][0],
            m42: rows[3][1],
            m43: rows[3][2],
            m44: rows[3][3],
        }
    }

    pub fn translation(&self) -> Vector3 {
        Vector3::new(self.m41, self.m42, self.m43)
    }
}

wire_enum! {
    /// Humanoid skeleton slot a bone is bound to
    #[derive(Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum BoneType: i32 {
        #[default]
        None = 0,
        Root = 1,
        Hips = 2,
        Spine = 3,
        Chest = 4,
        Neck = 5,
        Head = 6,
        LeftShoulder = 7,
        LeftUpperArm = 8,
        LeftLowerArm = 9,
        LeftHand = 10,
        RightShoulder = 11,
        RightUpperArm = 12,
        RightLowerArm = 13,
        RightHand = 14,
        LeftUpperLeg = 15,
        LeftLowerLeg = 16,
        LeftFoot = 17,
        LeftToes = 18,
        RightUpperLeg = 19,
        RightLowerLeg = 20,
        RightFoot = 21,
        RightToes = 22,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Bone {
    #[serde(rename = "Type")]
    pub kind: BoneType,
    pub bone_name: Option<String>,
    pub bind_pose: Matrix4x4,
}

// Tagged, but carried by value
wire_record! {
    tagged Bone {
        0 => kind,
        1 => bone_name,
        2 => bind_pose,
    }
}

/// Up to four bone influences on one vertex
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoneWeight {
    /// Number of the four slots in use
    pub count: u8,
    pub bone1: i32,
    pub bone2: i32,
    pub bone3: i32,
    pub bone4: i32,
    pub weight1: f32,
    pub weight2: f32,
    pub weight3: f32,
    pub weight4: f32,
}

wire_record! {
    positional BoneWeight {
        count,
        bone1, bone2, bone3, bone4,
        weight1, weight2, weight3, weight4,
    }
}

impl BoneWeight {
    /// Weight on a single bone
    pub fn single(bone: i32) -> Self {
        Self {
            count: 1,
            bone1: bone,
            weight1: 1.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LiveSubMesh {
    pub vertices: Vec<Vector3>,
    #[serde(rename = "UVs")]
    pub uvs: Vec<Vector2>,
    pub normals: Vec<Vector3>,
    pub bone_weights: Vec<BoneWeight>,
    /// Vertex indices, three per triangle
    pub triangles: Vec<i32>,
    /// Index into the owning mesh config's materials
    pub material_idx: i32,
}

wire_record! {
    tagged nullable LiveSubMesh {
        0 => vertices,
        1 => uvs,
        2 => normals,
        3 => bone_weights,
        4 => triangles,
        5 => material_idx,
    }
}

impl LiveSubMesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LiveMesh {
    pub bones: Vec<Bone>,
    pub sub_meshes: Vec<LiveSubMesh>,
    pub default_attach_points: Vec<AttachPoint>,
}

wire_record! {
    tagged nullable LiveMesh {
        0 => bones,
        1 => sub_meshes,
        2 => default_attach_points,
    }
}

impl LiveMesh {
    /// Index of the first bone bound to `kind`
    pub fn bone_index(&self, kind: BoneType) -> Option<usize> {
        self.bones.iter().position(|bone| bone.kind == kind)
    }
}

/// Keyframe tracks for one bone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LiveSubAnim {
    pub bone_id: i32,
    pub position_count: i32,
    pub position_times: Vec<f32>,
    pub position_x: Vec<f32>,
    pub position_y: Vec<f32>,
    pub position_z: Vec<f32>,
    pub rotation_count: i32,
    pub rotation_times: Vec<f32>,
    pub rotation_w: Vec<f32>,
    pub rotation_x: Vec<f32>,
    pub rotation_y: Vec<f32>,
    pub rotation_z: Vec<f32>,
    pub scaling_count: i32,
    pub scaling_times: Vec<f32>,
    pub scaling_x: Vec<f32>,
    pub scaling_y: Vec<f32>,
    pub scaling_z: Vec<f32>,
}

wire_record! {
    tagged nullable LiveSubAnim {
        0 => bone_id,
        1 => position_count,
        2 => position_times,
        3 => position_x,
        4 => position_y,
        5 => position_z,
        6 => rotation_count,
        7 => rotation_times,
        8 => rotation_w,
        9 => rotation_x,
        10 => rotation_y,
        11 => rotation_z,
        12 => scaling_count,
        13 => scaling_times,
        14 => scaling_x,
        15 => scaling_y,
        16 => scaling_z,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LiveAnim {
    /// Name of the source clip the tracks were baked from
    pub source_unique_name: Option<String>,
    pub bones: Vec<Bone>,
    pub bone_sub_anims: Vec<LiveSubAnim>,
}

wire_record! {
    tagged nullable LiveAnim {
        0 => source_unique_name,
        1 => bones,
        2 => bone_sub_anims,
    }
}
