use crate::core::mesh::RuntimeMesh;
use crate::core::shared::Face;

const UNASSIGNED: u32 = u32::MAX;

/// Computes a vertex remap placing vertices in the order the index buffer first
/// references them. Vertices no face references keep their relative order
/// after all referenced ones.
/// Returns `remap` with `remap[old] == new`.
pub fn first_use_remap(faces: &[Face], num_vertices: usize) -> Vec<u32> {
    let mut remap = vec![UNASSIGNED; num_vertices];
    let mut next = 0_u32;
    for &v in faces.iter().flatten() {
        let slot = &mut remap[v as usize];
        if *slot == UNASSIGNED {
            *slot = next;
            next += 1;
        }
    }
    for slot in remap.iter_mut().filter(|s| **s == UNASSIGNED) {
        *slot = next;
        next += 1;
    }
    remap
}

/// Moves every element to `remap[old]`. Empty arrays are left alone.
fn apply_remap<T: Copy + Default>(data: &mut Vec<T>, remap: &[u32]) {
    if data.is_empty() {
        return;
    }
    let mut out = vec![T::default(); data.len()];
    for (old, value) in data.iter().enumerate() {
        out[remap[old] as usize] = *value;
    }
    *data = out;
}

/// Rewrites the vertex buffer, every populated per-vertex array and the index
/// values into first-use order. The mesh must satisfy [`RuntimeMesh::validate`].
pub fn optimize_pre_transform(mesh: &mut RuntimeMesh) {
    let remap = first_use_remap(&mesh.faces, mesh.vertices.len());

    apply_remap(&mut mesh.vertices, &remap);
    apply_remap(&mut mesh.normals, &remap);
    apply_remap(&mut mesh.colors, &remap);
    apply_remap(&mut mesh.texcoord0, &remap);
    apply_remap(&mut mesh.texcoord1, &remap);
    apply_remap(&mut mesh.tangents, &remap);
    apply_remap(&mut mesh.bitangents, &remap);

    for v in mesh.faces.iter_mut().flatten() {
        *v = remap[*v as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::{Float2, Float3};

    #[test]
    fn remap_follows_first_use() {
        let faces = [[3, 1, 4], [1, 5, 3]];
        assert_eq!(first_use_remap(&faces, 6), vec![4, 1, 5, 0, 2, 3]);
    }

    #[test]
    fn attributes_travel_with_their_vertex() {
        let p = |x: f32| Float3::from([x, 0.0, 0.0]);
        let mut mesh = RuntimeMesh {
            vertices: vec![p(0.0), p(1.0), p(2.0), p(3.0)],
            normals: vec![p(10.0), p(11.0), p(12.0), p(13.0)],
            texcoord1: vec![Float2::from([0.0, 0.0]), Float2::from([1.0, 1.0]), Float2::from([2.0, 2.0]), Float2::from([3.0, 3.0])],
            faces: vec![[2, 0, 3], [3, 0, 1]],
            material: vec![4, 5],
            ..RuntimeMesh::new()
        };
        let before = mesh.clone();

        optimize_pre_transform(&mut mesh);

        assert_eq!(mesh.faces, vec![[0, 1, 2], [2, 1, 3]]);
        assert_eq!(mesh.vertices, vec![p(2.0), p(0.0), p(3.0), p(1.0)]);
        assert_eq!(mesh.normals, vec![p(12.0), p(10.0), p(13.0), p(11.0)]);
        assert_eq!(mesh.material, before.material);
        assert!(mesh.colors.is_empty());

        for (new_face, old_face) in mesh.faces.iter().zip(&before.faces) {
            for (&n, &o) in new_face.iter().zip(old_face) {
                assert_eq!(mesh.vertices[n as usize], before.vertices[o as usize]);
                assert_eq!(mesh.texcoord1[n as usize], before.texcoord1[o as usize]);
            }
        }
    }

    #[test]
    fn unreferenced_vertices_are_kept() {
        let p = |x: f32| Float3::from([x, 0.0, 0.0]);
        let mut mesh = RuntimeMesh {
            vertices: vec![p(0.0), p(1.0), p(2.0), p(3.0), p(4.0)],
            faces: vec![[4, 2, 3]],
            ..RuntimeMesh::new()
        };
        optimize_pre_transform(&mut mesh);
        assert_eq!(mesh.vertices, vec![p(4.0), p(2.0), p(3.0), p(0.0), p(1.0)]);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }
}
