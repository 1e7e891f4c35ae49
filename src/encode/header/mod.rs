use crate::core::bit_coder::ByteWriter;
use crate::core::mesh::{MeshArray, RuntimeMesh};
use crate::shared::header::{
    BinaryHeader,
    RUNTIME_MESH_BINARY_VERSION,
    RUNTIME_MESH_COMPRESSION_VERSION,
};

#[remain::sorted]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("The {array:?} array holds {len} elements, which does not fit a 32-bit byte count.")]
    ArrayTooLarge { array: MeshArray, len: usize },
}

/// Builds a fresh header from the current array sizes of `mesh`.
pub fn header_for(mesh: &RuntimeMesh, compressed: bool) -> Result<BinaryHeader, Err> {
    let mut byte_counts = [0_u32; 9];
    for (count, array) in byte_counts.iter_mut().zip(MeshArray::ALL) {
        let len = mesh.len_of(array);
        *count = len.checked_mul(array.element_size())
            .and_then(|bytes| u32::try_from(bytes).ok())
            .ok_or(Err::ArrayTooLarge { array, len })?;
    }

    Ok(
        BinaryHeader {
            header_version: RUNTIME_MESH_BINARY_VERSION,
            compression_version: if compressed { RUNTIME_MESH_COMPRESSION_VERSION } else { 0 },
            byte_counts,
        }
    )
}

pub fn encode_header<W>(mesh: &RuntimeMesh, writer: &mut W, cfg: &super::Config) -> Result<BinaryHeader, Err>
where
    W: ByteWriter,
{
    let header = header_for(mesh, cfg.compressed)?;
    header.write_to(writer);
    Ok(header)
}
