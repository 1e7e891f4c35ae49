use crate::core::bit_coder::ByteWriter;
use crate::core::mesh::RuntimeMesh;

/// Writes the triangle index buffer followed by the per-face material ids.
pub fn encode_connectivity<W>(mesh: &RuntimeMesh, writer: &mut W)
where
    W: ByteWriter,
{
    for face in &mesh.faces {
        for &index in face {
            writer.write_u32(index);
        }
    }
    for &material in &mesh.material {
        writer.write_u32(material);
    }
}
