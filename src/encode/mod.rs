pub(crate) mod header;
pub(crate) mod attribute;
pub(crate) mod connectivity;

pub use header::Err as HeaderErr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::bit_coder::ByteWriter;
use crate::core::error::ErrorKind;
use crate::core::mesh::RuntimeMesh;
use crate::core::shared::ConfigType;
use crate::shared::header::BinaryHeader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Stamps the supported compression version into the header. The payload
    /// layout is the same either way.
    pub compressed: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            compressed: false,
        }
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Header encoding error: {0}")]
    HeaderError(#[from] header::Err),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // a mesh whose arrays cannot be described by the header
            Err::HeaderError(_) => ErrorKind::MalformedSource,
        }
    }
}

/// Encodes the mesh into the provided byte stream: the header, then the raw
/// bytes of every populated array in container order.
/// Returns the header that was written.
pub fn encode<W>(mesh: &RuntimeMesh, writer: &mut W, cfg: &Config) -> Result<BinaryHeader, Err>
    where W: ByteWriter
{
    // Encode header
    let header = header::encode_header(mesh, writer, cfg)?;
    log::debug!(
        "encoding mesh: version {}, compression {}, {} payload bytes",
        header.header_version,
        header.compression_version,
        header.payload_len()
    );

    // Encode attributes
    attribute::encode_attributes(mesh, writer);

    // Encode connectivity
    connectivity::encode_connectivity(mesh, writer);

    Ok(header)
}

/// Encodes the mesh into a freshly allocated buffer.
pub fn encode_to_vec(mesh: &RuntimeMesh, cfg: &Config) -> Result<Vec<u8>, Err> {
    let header = header::header_for(mesh, cfg.compressed)?;
    let mut buffer = Vec::with_capacity(BinaryHeader::SIZE + header.payload_len() as usize);
    encode(mesh, &mut buffer, cfg)?;
    Ok(buffer)
}
