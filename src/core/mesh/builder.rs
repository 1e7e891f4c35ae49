use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};

use thiserror::Error;

use crate::core::shared::{Face, Float2, Float3};
use super::RuntimeMesh;

/// One vertex's attributes as they appear in a specific triangle, before
/// deduplication. Attributes the source did not supply for this corner are `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub position: Float3,
    pub normal: Option<Float3>,
    pub texcoord: Option<Float2>,
    pub color: Option<Float3>,
}

impl Corner {
    pub fn new(position: Float3) -> Self {
        Self { position, normal: None, texcoord: None, color: None }
    }
}

/// Structural identity of a vertex: position, normal and texture coordinate,
/// compared bit for bit.
/// Colors and tangent frames do not take part in identity; the first corner seen
/// for a key decides those values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniqueVertexKey {
    position: [u32; 3],
    normal: [u32; 3],
    texcoord: [u32; 2],
}

impl UniqueVertexKey {
    pub fn new(position: Float3, normal: Float3, texcoord: Float2) -> Self {
        Self {
            position: position.to_bits(),
            normal: normal.to_bits(),
            texcoord: texcoord.to_bits(),
        }
    }
}

impl Hash for UniqueVertexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for word in self.position.iter().chain(&self.normal).chain(&self.texcoord) {
            state.write_u32(*word);
        }
    }
}

/// 64-bit FNV-1a.
/// Fixed seed, so lookups behave the same on every platform and every run.
pub struct VertexKeyHasher(u64);

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl Default for VertexKeyHasher {
    fn default() -> Self {
        Self(FNV_OFFSET_BASIS)
    }
}

impl Hasher for VertexKeyHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn write_u32(&mut self, value: u32) {
        self.write(&value.to_le_bytes());
    }
}

type UniqueVertexMap = HashMap<UniqueVertexKey, u32, BuildHasherDefault<VertexKeyHasher>>;

/// Folds a stream of triangle corners into a shared vertex buffer and an index
/// buffer, collapsing corners with an identical [`UniqueVertexKey`].
///
/// Whether normals, texture coordinates and colors are emitted is decided once
/// for the whole sub-mesh: an attribute is present if any corner supplied it,
/// and corners that did not are filled with zero.
#[derive(Debug)]
pub struct MeshBuilder {
    corners: Vec<Corner>,
    materials: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            corners: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn with_capacity(num_faces: usize) -> Self {
        Self {
            corners: Vec::with_capacity(num_faces * 3),
            materials: Vec::with_capacity(num_faces),
        }
    }

    /// Appends one triangle. Material id 0 is the default material.
    pub fn add_triangle(&mut self, corners: [Corner; 3], material: u32) {
        self.corners.extend_from_slice(&corners);
        self.materials.push(material);
    }

    pub fn num_faces(&self) -> usize {
        self.materials.len()
    }

    pub fn build(self) -> Result<RuntimeMesh, Err> {
        let Self { corners, materials } = self;

        let has_normals = corners.iter().any(|c| c.normal.is_some());
        let has_texcoords = corners.iter().any(|c| c.texcoord.is_some());
        let has_colors = corners.iter().any(|c| c.color.is_some());

        let mut mesh = RuntimeMesh::new();
        let mut unique_vertex_map = UniqueVertexMap::default();
        let mut faces: Vec<Face> = Vec::with_capacity(materials.len());

        for triangle in corners.chunks_exact(3) {
            let mut face = [0_u32; 3];
            for (slot, corner) in face.iter_mut().zip(triangle) {
                let normal = corner.normal.unwrap_or_default();
                let texcoord = corner.texcoord.unwrap_or_default();
                let key = UniqueVertexKey::new(corner.position, normal, texcoord);

                *slot = match unique_vertex_map.get(&key) {
                    Some(&index) => index,
                    None => {
                        let index = u32::try_from(mesh.vertices.len())
                            .map_err(|_| Err::TooManyVertices(mesh.vertices.len()))?;
                        unique_vertex_map.insert(key, index);
                        mesh.vertices.push(corner.position);
                        if has_normals {
                            mesh.normals.push(normal);
                        }
                        if has_texcoords {
                            mesh.texcoord0.push(texcoord);
                        }
                        if has_colors {
                            mesh.colors.push(corner.color.unwrap_or_default());
                        }
                        index
                    }
                };
            }
            faces.push(face);
        }
        mesh.faces = faces;

        // An all-default material assignment is stored as an empty array.
        if materials.iter().any(|&m| m != 0) {
            mesh.material = materials;
        }

        Ok(mesh)
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("The sub-mesh has more than u32::MAX unique vertices ({0} so far).")]
    TooManyVertices(usize),
}
