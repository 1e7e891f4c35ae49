pub mod header {
    use serde::Serialize;

    use crate::core::bit_coder::{ByteReader, ByteWriter, ReaderErr};
    use crate::core::mesh::MeshArray;

    /// Container format tag. Bumped whenever the layout changes.
    pub const RUNTIME_MESH_BINARY_VERSION: u32 = 1;

    /// The only nonzero compression tag a decoder accepts. `0` marks a raw payload.
    pub const RUNTIME_MESH_COMPRESSION_VERSION: u32 = 1;

    /// Fixed-layout record preceding the payload: two version tags followed by
    /// one byte count per mesh array, in [`MeshArray::ALL`] order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct BinaryHeader {
        pub header_version: u32,
        pub compression_version: u32,
        pub byte_counts: [u32; 9],
    }

    impl BinaryHeader {
        /// Encoded size in bytes.
        pub const SIZE: usize = 4 * 11;

        #[inline]
        pub fn byte_count(&self, array: MeshArray) -> u32 {
            self.byte_counts[array as usize]
        }

        /// Total number of payload bytes the header announces.
        pub fn payload_len(&self) -> u64 {
            self.byte_counts.iter().map(|&c| c as u64).sum()
        }

        #[inline]
        pub fn write_to<W>(&self, writer: &mut W)
            where W: ByteWriter
        {
            writer.write_u32(self.header_version);
            writer.write_u32(self.compression_version);
            for &count in &self.byte_counts {
                writer.write_u32(count);
            }
        }

        #[inline]
        pub fn read_from<R>(reader: &mut R) -> Result<Self, ReaderErr>
            where R: ByteReader
        {
            let header_version = reader.read_u32()?;
            let compression_version = reader.read_u32()?;
            let mut byte_counts = [0_u32; 9];
            for count in byte_counts.iter_mut() {
                *count = reader.read_u32()?;
            }
            Ok(Self { header_version, compression_version, byte_counts })
        }
    }
}
