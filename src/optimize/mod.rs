pub mod cache;
pub mod fetch;

pub use cache::CacheStatistics;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::ErrorKind;
use crate::core::mesh::{self, RuntimeMesh};
use crate::core::shared::ConfigType;

/// Capacity of the simulated post-transform vertex cache.
pub const DEFAULT_CACHE_SIZE: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cache_size: usize,
    /// Run the vertex fetch pass after the index pass.
    pub reorder_vertices: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            reorder_vertices: true,
        }
    }
}

/// Cache diagnostics gathered around [`optimize_model`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub before: CacheStatistics,
    pub after: CacheStatistics,
    /// `false` when the greedy order would not have lowered the miss count and
    /// the input triangle order was kept.
    pub index_reorder_applied: bool,
    pub vertices_reordered: bool,
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("The vertex cache must hold at least one entry.")]
    EmptyCache,
    #[error("The mesh cannot be optimized: {0}")]
    InvalidMesh(#[from] mesh::Err),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::EmptyCache => ErrorKind::MalformedSource,
            Err::InvalidMesh(e) => e.kind(),
        }
    }
}

/// Index pass: reorders the faces (and the per-face material ids with them)
/// for post-transform cache locality. The resulting miss count never exceeds
/// the input's.
/// Returns the statistics before and after, and whether the new order was kept.
pub fn optimize_indices(mesh: &mut RuntimeMesh, cache_size: usize) -> Result<(CacheStatistics, CacheStatistics, bool), Err> {
    if cache_size == 0 {
        return Err(Err::EmptyCache);
    }
    mesh.validate()?;

    let num_vertices = mesh.vertices.len();
    let indices = mesh.indices();
    let before = cache::analyze_post_transform(&indices, num_vertices, cache_size);
    if mesh.faces.is_empty() {
        return Ok((before, before, false));
    }

    let order = cache::optimize_post_transform(&indices, num_vertices, cache_size);
    let faces = order.iter().map(|&t| mesh.faces[t]).collect::<Vec<_>>();
    let reordered = faces.iter().flatten().copied().collect::<Vec<_>>();
    let after = cache::analyze_post_transform(&reordered, num_vertices, cache_size);

    if after.misses > before.misses {
        log::debug!("greedy order raises misses ({} > {}), keeping input order", after.misses, before.misses);
        return Ok((before, before, false));
    }

    if !mesh.material.is_empty() {
        mesh.material = order.iter().map(|&t| mesh.material[t]).collect();
    }
    mesh.faces = faces;
    Ok((before, after, true))
}

/// Vertex fetch pass: rewrites every per-vertex array into first-use order of
/// the current index buffer.
pub fn optimize_vertex_fetch(mesh: &mut RuntimeMesh) -> Result<(), Err> {
    mesh.validate()?;
    fetch::optimize_pre_transform(mesh);
    Ok(())
}

/// Runs the index pass and then the vertex fetch pass in place.
/// Triangles and attribute values are unchanged; only their storage order is.
pub fn optimize_model(mesh: &mut RuntimeMesh, cfg: &Config) -> Result<OptimizationReport, Err> {
    let (before, after, index_reorder_applied) = optimize_indices(mesh, cfg.cache_size)?;
    log::info!("input acmr: {}, cache hit %: {}", before.acmr, before.hit_percent);

    if cfg.reorder_vertices {
        // the index pass already validated the mesh
        fetch::optimize_pre_transform(mesh);
    }
    log::info!("output acmr: {}, cache hit %: {}", after.acmr, after.hit_percent);

    Ok(
        OptimizationReport {
            before,
            after,
            index_reorder_applied,
            vertices_reordered: cfg.reorder_vertices,
        }
    )
}
