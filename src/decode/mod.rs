mod header;
mod attribute;
mod connectivity;

pub use header::Err as HeaderErr;

use serde::{Deserialize, Serialize};

use crate::core::bit_coder::{ByteReader, ReaderErr};
use crate::core::error::ErrorKind;
use crate::core::mesh::{self, RuntimeMesh};
use crate::core::shared::ConfigType;
use crate::shared::header::BinaryHeader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Validate the decoded mesh eagerly (index bounds and array lengths).
    /// Off by default; consumers are expected to validate before use.
    pub strict: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            strict: false,
        }
    }
}

#[remain::sorted]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Header decoding error: {0}")]
    HeaderError(#[from] header::Err),
    #[error("Decoded mesh is invalid: {0}")]
    InvalidMesh(#[from] mesh::Err),
    #[error("The payload is truncated: {declared} bytes declared, {available} available.")]
    TruncatedPayload { declared: u64, available: usize },
    #[error("The payload ended early: {0}")]
    UnexpectedEnd(#[from] ReaderErr),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::HeaderError(header::Err::CompressionVersionMismatch { .. })
            | Err::HeaderError(header::Err::HeaderVersionMismatch { .. }) => ErrorKind::VersionMismatch,
            Err::HeaderError(header::Err::MisalignedByteCount { .. }) => ErrorKind::MalformedSource,
            Err::HeaderError(header::Err::NotEnoughData(_))
            | Err::TruncatedPayload { .. }
            | Err::UnexpectedEnd(_) => ErrorKind::TruncatedFile,
            Err::InvalidMesh(e) => e.kind(),
        }
    }
}

/// Decodes a mesh container. No partial mesh is ever returned.
pub fn decode<R>(reader: &mut R, cfg: &Config) -> Result<RuntimeMesh, Err>
    where R: ByteReader
{
    Ok(decode_with_header(reader, cfg)?.0)
}

/// Same as [`decode`], also handing back the header that was read.
pub fn decode_with_header<R>(reader: &mut R, cfg: &Config) -> Result<(RuntimeMesh, BinaryHeader), Err>
    where R: ByteReader
{
    // Decode header
    let header = header::decode_header(reader)?;
    log::debug!(
        "decoding mesh: version {}, compression {}, byte counts {:?}",
        header.header_version,
        header.compression_version,
        header.byte_counts
    );

    if let Some(available) = reader.remaining() {
        if (available as u64) < header.payload_len() {
            return Err(Err::TruncatedPayload { declared: header.payload_len(), available });
        }
    }

    let mut mesh = RuntimeMesh::new();

    // Decode attributes
    attribute::decode_attributes(reader, &header, &mut mesh)?;

    // Decode connectivity
    connectivity::decode_connectivity(reader, &header, &mut mesh)?;

    if cfg.strict {
        mesh.validate()?;
    }

    Ok((mesh, header))
}

/// Reserving `len` elements up front is only safe when the source is known to
/// hold them; otherwise grow as the data arrives.
pub(crate) fn capacity_hint<R: ByteReader>(reader: &R, len: usize, element_size: usize) -> usize {
    match reader.remaining() {
        Some(available) => len.min(available / element_size),
        None => len.min(1 << 16),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bit_coder::SliceReader;
    use crate::core::shared::{Float2, Float3};
    use crate::encode;

    fn quad() -> RuntimeMesh {
        RuntimeMesh {
            vertices: vec![
                Float3::from([0.0, 0.0, 0.0]),
                Float3::from([1.0, 0.0, 0.0]),
                Float3::from([1.0, 1.0, 0.0]),
                Float3::from([0.0, 1.0, 0.0]),
            ],
            normals: vec![Float3::from([0.0, 0.0, 1.0]); 4],
            texcoord0: vec![
                Float2::from([0.0, 0.0]),
                Float2::from([1.0, 0.0]),
                Float2::from([1.0, 1.0]),
                Float2::from([0.0, 1.0]),
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
            material: vec![1, 2],
            ..RuntimeMesh::new()
        }
    }

    #[test]
    fn round_trip() {
        let mesh = quad();
        let buffer = encode::encode_to_vec(&mesh, &encode::Config::default()).unwrap();
        let (decoded, header) = decode_with_header(&mut SliceReader::new(&buffer), &Config { strict: true }).unwrap();
        assert_eq!(decoded, mesh);
        assert_eq!(header.compression_version, 0);
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let buffer = encode::encode_to_vec(&quad(), &encode::Config::default()).unwrap();
        let short = &buffer[..buffer.len() - 1];
        assert!(matches!(
            decode(&mut SliceReader::new(short), &Config::default()),
            Err(Err::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn strict_mode_checks_indices() {
        let mut mesh = quad();
        mesh.faces[1] = [0, 2, 9];
        let buffer = encode::encode_to_vec(&mesh, &encode::Config::default()).unwrap();

        // lenient decoding hands the indices through untouched
        let lenient = decode(&mut SliceReader::new(&buffer), &Config::default()).unwrap();
        assert_eq!(lenient.faces[1], [0, 2, 9]);

        assert!(matches!(
            decode(&mut SliceReader::new(&buffer), &Config { strict: true }),
            Err(Err::InvalidMesh(mesh::Err::IndexOutOfRange { face: 1, index: 9, .. }))
        ));
    }
}
