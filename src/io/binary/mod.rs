use std::fs;
use std::path::{Path, PathBuf};

use crate::core::bit_coder::SliceReader;
use crate::core::mesh::RuntimeMesh;
use crate::core::shared::ConfigType;
use crate::shared::header::BinaryHeader;
use crate::{decode, encode};
use super::Err;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Err + '_ {
    move |source| Err::Io { path: path.to_path_buf(), source }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `mesh` as a mesh container at `path`.
///
/// The container is assembled in memory and written to a sibling file that is
/// renamed over `path` once complete, so a failed export never leaves a
/// partial container behind.
pub fn export_mesh_binary<P: AsRef<Path>>(path: P, mesh: &RuntimeMesh, compressed: bool) -> Result<BinaryHeader, Err> {
    let path = path.as_ref();
    let cfg = encode::Config { compressed };
    let mut buffer = Vec::new();
    let header = encode::encode(mesh, &mut buffer, &cfg)?;

    let staging = staging_path(path);
    let result = fs::write(&staging, &buffer)
        .and_then(|_| fs::rename(&staging, path));
    if let Err(source) = result {
        // the staging file may not exist; nothing more to do either way
        let _ = fs::remove_file(&staging);
        return Err(io_err(path)(source));
    }

    log::info!("wrote {:?}: {} vertices, {} faces, {} bytes", path, mesh.vertices.len(), mesh.faces.len(), buffer.len());
    Ok(header)
}

/// Reads a mesh container with the default (lenient) decoder settings.
pub fn import_mesh_binary<P: AsRef<Path>>(path: P) -> Result<RuntimeMesh, Err> {
    import_mesh_binary_with(path, &decode::Config::default())
}

pub fn import_mesh_binary_with<P: AsRef<Path>>(path: P, cfg: &decode::Config) -> Result<RuntimeMesh, Err> {
    Ok(read_mesh_binary(path.as_ref(), cfg)?.0)
}

/// Reads a mesh container, also returning its header.
pub fn read_mesh_binary(path: &Path, cfg: &decode::Config) -> Result<(RuntimeMesh, BinaryHeader), Err> {
    let buffer = fs::read(path).map_err(io_err(path))?;
    let (mesh, header) = decode::decode_with_header(&mut SliceReader::new(&buffer), cfg)?;
    log::debug!("read {:?}: {} vertices, {} faces", path, mesh.vertices.len(), mesh.faces.len());
    Ok((mesh, header))
}
