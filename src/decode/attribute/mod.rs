use crate::core::bit_coder::{ByteReader, ReaderErr};
use crate::core::mesh::{MeshArray, RuntimeMesh};
use crate::core::shared::NdVector;
use crate::shared::header::BinaryHeader;

/// Reads the per-vertex arrays, sizing each from its header byte count.
pub fn decode_attributes<R>(reader: &mut R, header: &BinaryHeader, mesh: &mut RuntimeMesh) -> Result<(), ReaderErr>
where
    R: ByteReader,
{
    mesh.vertices = read_vectors(reader, header, MeshArray::Vertices)?;
    mesh.normals = read_vectors(reader, header, MeshArray::Normals)?;
    mesh.colors = read_vectors(reader, header, MeshArray::Colors)?;
    mesh.texcoord0 = read_vectors(reader, header, MeshArray::Texcoord0)?;
    mesh.texcoord1 = read_vectors(reader, header, MeshArray::Texcoord1)?;
    mesh.tangents = read_vectors(reader, header, MeshArray::Tangents)?;
    mesh.bitangents = read_vectors(reader, header, MeshArray::Bitangents)?;
    Ok(())
}

fn read_vectors<R, const N: usize>(reader: &mut R, header: &BinaryHeader, array: MeshArray) -> Result<Vec<NdVector<N, f32>>, ReaderErr>
where
    R: ByteReader,
{
    debug_assert_eq!(array.element_size(), N * 4);
    let len = header.byte_count(array) as usize / array.element_size();
    let mut out = Vec::with_capacity(super::capacity_hint(reader, len, array.element_size()));
    for _ in 0..len {
        out.push(reader.read_vector()?);
    }
    Ok(out)
}
