pub mod binary;
pub mod obj;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::core::error::ErrorKind;
use crate::core::mesh::builder::{self, MeshBuilder};
use crate::core::mesh::RuntimeMesh;
use crate::{decode, encode};

/// Geometry read from a source asset, before deduplication.
#[derive(Debug)]
pub struct SourceAsset {
    /// Corner streams keyed by sub-mesh name, in the order the source declares them.
    pub sub_meshes: IndexMap<String, MeshBuilder>,
    /// Material names by id. Id 0 is the default material.
    pub materials: Vec<String>,
}

/// Deduplicated sub-meshes of one model together with its material table.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedModel {
    pub meshes: IndexMap<String, RuntimeMesh>,
    /// Material names by id, as in [`SourceAsset::materials`].
    pub materials: Vec<String>,
}

/// Turns a source file of one exchange format into per-sub-mesh corner streams.
///
/// The OBJ adapter ships with the crate; other formats (FBX, for instance) are
/// provided by the caller and registered on an [`Importer`].
pub trait SourceAdapter {
    /// Lower-case file extensions this adapter understands.
    fn extensions(&self) -> &[&str];

    fn load(&self, path: &Path) -> Result<SourceAsset, Err>;
}

/// Dispatches source files to adapters by extension.
pub struct Importer {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Importer {
    /// An importer without any adapter.
    pub fn empty() -> Self {
        Self { adapters: Vec::new() }
    }

    /// An importer with the built-in OBJ adapter.
    pub fn new() -> Self {
        let mut importer = Self::empty();
        importer.register(Box::new(obj::ObjAdapter::default()));
        importer
    }

    /// Adds an adapter. Adapters registered later take precedence for an
    /// extension claimed more than once.
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.insert(0, adapter);
    }

    pub fn adapter_for(&self, path: &Path) -> Result<&dyn SourceAdapter, Err> {
        let ext = path.extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        self.adapters.iter()
            .find(|a| a.extensions().iter().any(|e| *e == ext))
            .map(|a| a.as_ref())
            .ok_or_else(|| Err::UnsupportedFormat(path.to_path_buf()))
    }

    /// Loads `path` and deduplicates every sub-mesh.
    /// Either every sub-mesh is returned or none is.
    pub fn import<P: AsRef<Path>>(&self, path: P) -> Result<IndexMap<String, RuntimeMesh>, Err> {
        Ok(self.import_with_materials(path)?.meshes)
    }

    /// Same as [`Importer::import`], also handing back the material names that
    /// the per-face material ids refer to.
    pub fn import_with_materials<P: AsRef<Path>>(&self, path: P) -> Result<ImportedModel, Err> {
        let path = path.as_ref();
        let asset = self.adapter_for(path)?.load(path)?;

        let mut meshes = IndexMap::with_capacity(asset.sub_meshes.len());
        for (name, builder) in asset.sub_meshes {
            let num_faces = builder.num_faces();
            let mesh = builder.build()?;
            log::debug!(
                "sub-mesh {:?}: {} faces, {} unique vertices",
                name,
                num_faces,
                mesh.vertices.len()
            );
            meshes.insert(name, mesh);
        }
        Ok(ImportedModel { meshes, materials: asset.materials })
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

/// Imports every sub-mesh of a model file, choosing the reader by extension.
pub fn import_model<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, RuntimeMesh>, Err> {
    Importer::new().import(path)
}

/// Like [`import_model`], keeping the material table.
pub fn import_model_with_materials<P: AsRef<Path>>(path: P) -> Result<ImportedModel, Err> {
    Importer::new().import_with_materials(path)
}

#[remain::sorted]
#[derive(Error, Debug)]
pub enum Err {
    #[error("Mesh building error: {0}")]
    BuilderError(#[from] builder::Err),
    #[error("Mesh decoding error: {0}")]
    DecodeError(#[from] decode::Err),
    #[error("Mesh encoding error: {0}")]
    EncodeError(#[from] encode::Err),
    #[error("I/O error on {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Malformed source {path:?}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },
    #[error("OBJ import error: {0}")]
    ObjError(#[from] obj::Err),
    #[error("No adapter for {0:?}")]
    UnsupportedFormat(PathBuf),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::BuilderError(_) | Err::MalformedSource { .. } => ErrorKind::MalformedSource,
            Err::DecodeError(e) => e.kind(),
            Err::EncodeError(e) => e.kind(),
            Err::Io { .. } => ErrorKind::Io,
            Err::ObjError(e) => e.kind(),
            Err::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
        }
    }
}
