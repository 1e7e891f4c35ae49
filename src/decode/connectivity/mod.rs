use crate::core::bit_coder::{ByteReader, ReaderErr};
use crate::core::mesh::{MeshArray, RuntimeMesh};
use crate::shared::header::BinaryHeader;

/// Reads the triangle index buffer and the per-face material ids.
/// Index values are taken as stored; bounds are checked by the caller.
pub fn decode_connectivity<R>(reader: &mut R, header: &BinaryHeader, mesh: &mut RuntimeMesh) -> Result<(), ReaderErr>
where
    R: ByteReader,
{
    let num_faces = header.byte_count(MeshArray::Faces) as usize / MeshArray::Faces.element_size();
    let mut faces = Vec::with_capacity(super::capacity_hint(reader, num_faces, MeshArray::Faces.element_size()));
    for _ in 0..num_faces {
        faces.push([reader.read_u32()?, reader.read_u32()?, reader.read_u32()?]);
    }
    mesh.faces = faces;

    let num_materials = header.byte_count(MeshArray::Materials) as usize / MeshArray::Materials.element_size();
    let mut material = Vec::with_capacity(super::capacity_hint(reader, num_materials, MeshArray::Materials.element_size()));
    for _ in 0..num_materials {
        material.push(reader.read_u32()?);
    }
    mesh.material = material;
    Ok(())
}
