pub mod builder;

use thiserror::Error;

use super::shared::{Face, Float2, Float3};

/// The canonical in-memory mesh asset.
///
/// Per-vertex arrays (`normals`, `colors`, `texcoord0`, `texcoord1`, `tangents`,
/// `bitangents`) are either empty or exactly as long as `vertices`. `material`
/// is either empty (every face uses the default material) or holds one id per
/// face. Every index in `faces` addresses `vertices` and, by construction, every
/// populated per-vertex array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeMesh {
    pub vertices: Vec<Float3>,
    pub normals: Vec<Float3>,
    pub colors: Vec<Float3>,
    pub texcoord0: Vec<Float2>,
    pub texcoord1: Vec<Float2>,
    pub tangents: Vec<Float3>,
    pub bitangents: Vec<Float3>,
    pub faces: Vec<Face>,
    pub material: Vec<u32>,
}

/// Identifies one of the arrays of a [`RuntimeMesh`], in container field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshArray {
    Vertices,
    Normals,
    Colors,
    Texcoord0,
    Texcoord1,
    Tangents,
    Bitangents,
    Faces,
    Materials,
}

impl MeshArray {
    pub const ALL: [MeshArray; 9] = [
        MeshArray::Vertices,
        MeshArray::Normals,
        MeshArray::Colors,
        MeshArray::Texcoord0,
        MeshArray::Texcoord1,
        MeshArray::Tangents,
        MeshArray::Bitangents,
        MeshArray::Faces,
        MeshArray::Materials,
    ];

    /// Size in bytes of one element on the wire.
    pub fn element_size(self) -> usize {
        match self {
            MeshArray::Texcoord0 | MeshArray::Texcoord1 => 8,
            MeshArray::Materials => 4,
            _ => 12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MeshArray::Vertices => "vertices",
            MeshArray::Normals => "normals",
            MeshArray::Colors => "colors",
            MeshArray::Texcoord0 => "texcoord0",
            MeshArray::Texcoord1 => "texcoord1",
            MeshArray::Tangents => "tangents",
            MeshArray::Bitangents => "bitangents",
            MeshArray::Faces => "faces",
            MeshArray::Materials => "materials",
        }
    }

    fn is_per_vertex(self) -> bool {
        !matches!(self, MeshArray::Vertices | MeshArray::Faces | MeshArray::Materials)
    }
}

impl RuntimeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of elements currently held by `array`.
    pub fn len_of(&self, array: MeshArray) -> usize {
        match array {
            MeshArray::Vertices => self.vertices.len(),
            MeshArray::Normals => self.normals.len(),
            MeshArray::Colors => self.colors.len(),
            MeshArray::Texcoord0 => self.texcoord0.len(),
            MeshArray::Texcoord1 => self.texcoord1.len(),
            MeshArray::Tangents => self.tangents.len(),
            MeshArray::Bitangents => self.bitangents.len(),
            MeshArray::Faces => self.faces.len(),
            MeshArray::Materials => self.material.len(),
        }
    }

    /// Flattened index buffer, three entries per face.
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Checks the array-length invariants and the index bound invariant.
    pub fn validate(&self) -> Result<(), Err> {
        let num_vertices = self.vertices.len();
        for array in MeshArray::ALL.into_iter().filter(|a| a.is_per_vertex()) {
            let len = self.len_of(array);
            if len != 0 && len != num_vertices {
                return Err(Err::AttributeLengthMismatch { array, len, expected: num_vertices });
            }
        }
        if !self.material.is_empty() && self.material.len() != self.faces.len() {
            return Err(Err::AttributeLengthMismatch {
                array: MeshArray::Materials,
                len: self.material.len(),
                expected: self.faces.len(),
            });
        }
        self.validate_indices()
    }

    /// Checks only that every face index addresses an existing vertex.
    pub fn validate_indices(&self) -> Result<(), Err> {
        let num_vertices = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= num_vertices) {
                return Err(Err::IndexOutOfRange { face: face_idx, index, num_vertices });
            }
        }
        Ok(())
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("The {array:?} array has {len} elements, but {expected} were expected.")]
    AttributeLengthMismatch { array: MeshArray, len: usize, expected: usize },

    #[error("Face {face} references vertex {index}, but the mesh only has {num_vertices} vertices.")]
    IndexOutOfRange { face: usize, index: u32, num_vertices: usize },
}
