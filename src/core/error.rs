use serde::Serialize;

/// Coarse classification shared by every error the pipeline surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The file extension has no registered adapter.
    UnsupportedFormat,
    /// The source or container is structurally wrong: a non-triangular face,
    /// a byte count that does not divide into elements, inconsistent array sizes.
    MalformedSource,
    /// The container's format or compression tag is not supported.
    VersionMismatch,
    /// The stream ended before the declared payload was read.
    TruncatedFile,
    /// A face references a vertex past the end of the vertex buffer.
    IndexOutOfRange,
    /// The operating system refused a read, write or rename.
    Io,
}

impl super::mesh::Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AttributeLengthMismatch { .. } => ErrorKind::MalformedSource,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
        }
    }
}
