use crate::core::bit_coder::ByteWriter;
use crate::core::mesh::RuntimeMesh;
use crate::core::shared::NdVector;

/// Writes the per-vertex arrays in container order. Empty arrays write nothing.
pub fn encode_attributes<W>(mesh: &RuntimeMesh, writer: &mut W)
where
    W: ByteWriter,
{
    write_vectors(&mesh.vertices, writer);
    write_vectors(&mesh.normals, writer);
    write_vectors(&mesh.colors, writer);
    write_vectors(&mesh.texcoord0, writer);
    write_vectors(&mesh.texcoord1, writer);
    write_vectors(&mesh.tangents, writer);
    write_vectors(&mesh.bitangents, writer);
}

fn write_vectors<W, const N: usize>(data: &[NdVector<N, f32>], writer: &mut W)
where
    W: ByteWriter,
{
    for v in data {
        writer.write_vector(v);
    }
}
