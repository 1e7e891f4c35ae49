use crate::core::bit_coder::{ByteReader, ReaderErr};
use crate::core::mesh::MeshArray;
use crate::shared::header::{
    BinaryHeader,
    RUNTIME_MESH_BINARY_VERSION,
    RUNTIME_MESH_COMPRESSION_VERSION,
};

#[remain::sorted]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Unsupported compression version {found}.")]
    CompressionVersionMismatch { found: u32 },
    #[error("Unsupported container version {found}.")]
    HeaderVersionMismatch { found: u32 },
    #[error("The {array:?} array is declared with {bytes} bytes, which is not a multiple of {element_size}.")]
    MisalignedByteCount { array: MeshArray, bytes: u32, element_size: usize },
    #[error("Not enough data: {0}")]
    NotEnoughData(#[from] ReaderErr),
}

/// Reads the header and checks it before any payload byte is touched.
pub fn decode_header<R>(reader: &mut R) -> Result<BinaryHeader, Err>
where
    R: ByteReader,
{
    let header = BinaryHeader::read_from(reader)?;

    if header.header_version != RUNTIME_MESH_BINARY_VERSION {
        return Err(Err::HeaderVersionMismatch { found: header.header_version });
    }

    if header.compression_version != 0 && header.compression_version != RUNTIME_MESH_COMPRESSION_VERSION {
        return Err(Err::CompressionVersionMismatch { found: header.compression_version });
    }

    for array in MeshArray::ALL {
        let bytes = header.byte_count(array);
        let element_size = array.element_size();
        if bytes as usize % element_size != 0 {
            return Err(Err::MisalignedByteCount { array, bytes, element_size });
        }
    }

    Ok(header)
}
