use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::ErrorKind;
use crate::core::mesh::builder::{Corner, MeshBuilder};
use crate::core::shared::{ConfigType, Float2, Float3};
use super::{SourceAdapter, SourceAsset};

pub const DEFAULT_MATERIAL_NAME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Keep importing with the default material when a referenced material
    /// library cannot be read.
    pub allow_missing_materials: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            allow_missing_materials: true,
        }
    }
}

#[remain::sorted]
#[derive(Error, Debug)]
pub enum Err {
    #[error("Shape {shape:?} has {found} face corners left to match, {expected} expected.")]
    FaceScanMismatch { shape: String, found: usize, expected: usize },
    #[error("Shape {shape:?} references {attribute} {index}, which does not exist.")]
    InvalidIndex { shape: String, attribute: &'static str, index: u32 },
    #[error("Failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Failed to load {path:?}: {source}")]
    LoadError { path: PathBuf, source: tobj::LoadError },
    #[error("Failed to load the material library of {path:?}: {source}")]
    MaterialLoadError { path: PathBuf, source: tobj::LoadError },
    #[error("Face {face} of shape {shape:?} has {arity} vertices; only triangles are accepted.")]
    NonTriangularFace { shape: String, face: usize, arity: u32 },
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::LoadError { source, .. } | Err::MaterialLoadError { source, .. } => match source {
                tobj::LoadError::OpenFileFailed | tobj::LoadError::ReadError => ErrorKind::Io,
                _ => ErrorKind::MalformedSource,
            },
            Err::Io { .. } => ErrorKind::Io,
            Err::FaceScanMismatch { .. }
            | Err::InvalidIndex { .. }
            | Err::NonTriangularFace { .. } => ErrorKind::MalformedSource,
        }
    }
}

/// Wavefront OBJ reader.
///
/// Faces must already be triangles. Shapes sharing a name are merged into one
/// sub-mesh. Material ids are 0 for faces without a material and `i + 1` for
/// the `i`-th material of the library.
#[derive(Debug, Clone)]
pub struct ObjAdapter {
    cfg: Config,
}

impl ObjAdapter {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }
}

impl Default for ObjAdapter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl SourceAdapter for ObjAdapter {
    fn extensions(&self) -> &[&str] {
        &["obj"]
    }

    fn load(&self, path: &Path) -> Result<SourceAsset, super::Err> {
        Ok(load(path, &self.cfg)?)
    }
}

/// Optional attributes a face corner names in its `v/vt/vn` token.
/// tobj pads the index lists of corners without `vt` or `vn` with index 0,
/// so presence has to come from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CornerRefs {
    texcoord: bool,
    normal: bool,
}

/// Lists the corners of every `f` statement in file order, which is also the
/// order of the models' index lists concatenated.
fn scan_face_corners(source: &str) -> Vec<CornerRefs> {
    let mut corners = Vec::new();
    let mut statement = String::new();
    for line in source.lines() {
        let line = line.split('#').next().unwrap_or_default();
        if let Some(head) = line.trim_end().strip_suffix('\\') {
            statement.push_str(head);
            statement.push(' ');
            continue;
        }
        statement.push_str(line);

        let mut words = statement.split_whitespace();
        if words.next() == Some("f") {
            corners.extend(words.map(|token| {
                let mut refs = token.split('/').skip(1);
                let texcoord = refs.next().is_some_and(|s| !s.is_empty());
                let normal = refs.next().is_some_and(|s| !s.is_empty());
                CornerRefs { texcoord, normal }
            }));
        }
        statement.clear();
    }
    corners
}

fn float3(data: &[f32], index: u32) -> Option<Float3> {
    let start = index as usize * 3;
    let v = data.get(start..start + 3)?;
    Some(Float3::from([v[0], v[1], v[2]]))
}

fn float2(data: &[f32], index: u32) -> Option<Float2> {
    let start = index as usize * 2;
    let v = data.get(start..start + 2)?;
    Some(Float2::from([v[0], v[1]]))
}

fn check_triangles(name: &str, mesh: &tobj::Mesh) -> Result<(), Err> {
    // tobj leaves the arities empty when every face is a triangle
    if let Some(face) = mesh.face_arities.iter().position(|&a| a != 3) {
        let arity = mesh.face_arities[face];
        return Err(Err::NonTriangularFace { shape: name.to_owned(), face, arity });
    }
    if mesh.face_arities.is_empty() && mesh.indices.len() % 3 != 0 {
        return Err(Err::NonTriangularFace {
            shape: name.to_owned(),
            face: mesh.indices.len() / 3,
            arity: (mesh.indices.len() % 3) as u32,
        });
    }
    Ok(())
}

/// Reads one shape's triangles into `builder`. `refs` holds one entry per
/// corner of the shape.
fn append_shape(name: &str, mesh: &tobj::Mesh, refs: &[CornerRefs], builder: &mut MeshBuilder) -> Result<(), Err> {
    let num_corners = mesh.indices.len();
    let with_normals = refs.iter().filter(|r| r.normal).count();
    if with_normals != 0 && with_normals != num_corners {
        log::warn!("shape {:?}: {} of {} corners carry no normal, using zero", name, num_corners - with_normals, num_corners);
    }
    let with_texcoords = refs.iter().filter(|r| r.texcoord).count();
    if with_texcoords != 0 && with_texcoords != num_corners {
        log::warn!("shape {:?}: {} of {} corners carry no texture coordinate, using zero", name, num_corners - with_texcoords, num_corners);
    }
    let has_colors = !mesh.vertex_color.is_empty() && mesh.vertex_color.len() == mesh.positions.len();

    let invalid = |attribute, index| Err::InvalidIndex { shape: name.to_owned(), attribute, index };
    let material = mesh.material_id.map_or(0, |id| id as u32 + 1);

    for (t, (triangle, triangle_refs)) in mesh.indices.chunks_exact(3).zip(refs.chunks_exact(3)).enumerate() {
        let mut corners = [Corner::new(Float3::ZERO); 3];
        for (k, ((corner, &p), r)) in corners.iter_mut().zip(triangle).zip(triangle_refs).enumerate() {
            let i = t * 3 + k;
            corner.position = float3(&mesh.positions, p).ok_or_else(|| invalid("position", p))?;
            if has_colors {
                corner.color = Some(float3(&mesh.vertex_color, p).ok_or_else(|| invalid("color", p))?);
            }
            if r.normal {
                let n = *mesh.normal_indices.get(i).ok_or_else(|| invalid("normal", i as u32))?;
                corner.normal = Some(float3(&mesh.normals, n).ok_or_else(|| invalid("normal", n))?);
            }
            if r.texcoord {
                let uv = *mesh.texcoord_indices.get(i).ok_or_else(|| invalid("texture coordinate", i as u32))?;
                corner.texcoord = Some(float2(&mesh.texcoords, uv).ok_or_else(|| invalid("texture coordinate", uv))?);
            }
        }
        builder.add_triangle(corners, material);
    }
    Ok(())
}

/// Reads an OBJ file into per-shape corner streams.
pub fn load(path: &Path, cfg: &Config) -> Result<SourceAsset, Err> {
    let source = fs::read_to_string(path)
        .map_err(|source| Err::Io { path: path.to_path_buf(), source })?;
    let corner_refs = scan_face_corners(&source);

    let options = tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let (models, materials) = tobj::load_obj_buf(&mut source.as_bytes(), &options, |mtl| tobj::load_mtl(base.join(mtl)))
        .map_err(|source| Err::LoadError { path: path.to_path_buf(), source })?;

    let mut names = vec![DEFAULT_MATERIAL_NAME.to_owned()];
    match materials {
        Ok(materials) => names.extend(materials.into_iter().map(|m| m.name)),
        Err(source) if cfg.allow_missing_materials => {
            log::warn!("{:?}: material library unavailable ({}), using the default material", path, source);
        }
        Err(source) => return Err(Err::MaterialLoadError { path: path.to_path_buf(), source }),
    }

    let mut sub_meshes: IndexMap<String, MeshBuilder> = IndexMap::new();
    let mut offset = 0;
    for model in &models {
        check_triangles(&model.name, &model.mesh)?;
        let num_corners = model.mesh.indices.len();
        let refs = corner_refs.get(offset..offset + num_corners)
            .ok_or_else(|| Err::FaceScanMismatch {
                shape: model.name.clone(),
                found: corner_refs.len().saturating_sub(offset),
                expected: num_corners,
            })?;
        offset += num_corners;

        let builder = sub_meshes.entry(model.name.clone())
            .or_insert_with(|| MeshBuilder::with_capacity(num_corners / 3));
        append_shape(&model.name, &model.mesh, refs, builder)?;
    }

    log::info!(
        "{:?}: {} shapes in {} sub-meshes, {} materials",
        path,
        models.len(),
        sub_meshes.len(),
        names.len() - 1
    );

    Ok(SourceAsset { sub_meshes, materials: names })
}
