use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meshpack::core::mesh::MeshArray;
use meshpack::io::binary::read_mesh_binary;
use meshpack::optimize::{self, cache};
use meshpack::prelude::*;

#[derive(Parser)]
#[command(name = "meshpack")]
#[command(about = "Imports, optimizes and packs triangle meshes into binary containers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a model and write one container per sub-mesh
    Convert {
        /// Source model (.obj)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the `<sub-mesh>.mesh` files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Skip the vertex cache and vertex fetch passes
        #[arg(long)]
        no_optimize: bool,

        /// Tag the containers as compressed
        #[arg(long)]
        compressed: bool,
    },
    /// Print the header, array sizes and cache statistics of a container
    Inspect {
        file: PathBuf,

        /// Reject out-of-range indices
        #[arg(long)]
        strict: bool,

        #[arg(long)]
        json: bool,
    },
    /// Optimize an existing container
    Optimize {
        file: PathBuf,

        /// Where to write the result; defaults to rewriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = optimize::DEFAULT_CACHE_SIZE)]
        cache_size: usize,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Convert { input, output_dir, no_optimize, compressed } => {
            convert(&input, &output_dir, !no_optimize, compressed)
        }
        Command::Inspect { file, strict, json } => inspect(&file, strict, json),
        Command::Optimize { file, output, cache_size, json } => {
            let output = output.unwrap_or_else(|| file.clone());
            optimize_container(&file, &output, cache_size, json)
        }
    }
}

/// Turns a sub-mesh name into a file stem.
fn file_stem(name: &str) -> String {
    let stem = name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>();
    if stem.is_empty() { "mesh".to_owned() } else { stem }
}

fn convert(input: &Path, output_dir: &Path, run_optimizer: bool, compressed: bool) -> Result<()> {
    let ImportedModel { meshes, materials } = import_model_with_materials(input)
        .with_context(|| format!("failed to import {}", input.display()))?;
    for (id, name) in materials.iter().enumerate() {
        log::debug!("material {}: {}", id, name);
    }
    if meshes.is_empty() {
        anyhow::bail!("{} contains no triangles", input.display());
    }
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    for (name, mut mesh) in meshes {
        if run_optimizer {
            let report = optimize_model(&mut mesh, &optimize::Config::default())
                .with_context(|| format!("failed to optimize sub-mesh {:?}", name))?;
            log::info!("{}: acmr {:.3} -> {:.3}", name, report.before.acmr, report.after.acmr);
        }
        let path = output_dir.join(file_stem(&name)).with_extension("mesh");
        export_mesh_binary(&path, &mesh, compressed)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

fn inspect(file: &Path, strict: bool, json: bool) -> Result<()> {
    let (mesh, header) = read_mesh_binary(file, &decode::Config { strict })
        .with_context(|| format!("failed to read {}", file.display()))?;
    let lengths = MeshArray::ALL.iter()
        .map(|&array| (array.name(), mesh.len_of(array)))
        .collect::<Vec<_>>();
    // statistics are only meaningful for in-range indices
    let stats = mesh.validate_indices().ok()
        .map(|_| cache::analyze_post_transform(&mesh.indices(), mesh.vertices.len(), optimize::DEFAULT_CACHE_SIZE));

    if json {
        let value = serde_json::json!({
            "header": header,
            "lengths": lengths.iter()
                .map(|&(name, len)| (name.to_owned(), serde_json::Value::from(len)))
                .collect::<serde_json::Map<_, _>>(),
            "cache": stats,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("header version:      {}", header.header_version);
    println!("compression version: {}", header.compression_version);
    for (array, (name, len)) in MeshArray::ALL.iter().zip(&lengths) {
        println!("{:<12} {:>8} elements {:>10} bytes", name, len, header.byte_count(*array));
    }
    match stats {
        Some(stats) => println!(
            "acmr {:.3}, cache hit {:.1}% ({} misses over {} triangles)",
            stats.acmr, stats.hit_percent, stats.misses, stats.num_triangles
        ),
        None => println!("faces reference missing vertices; no cache statistics"),
    }
    Ok(())
}

fn optimize_container(file: &Path, output: &Path, cache_size: usize, json: bool) -> Result<()> {
    let (mut mesh, header) = read_mesh_binary(file, &decode::Config { strict: true })
        .with_context(|| format!("failed to read {}", file.display()))?;
    let cfg = optimize::Config { cache_size, ..optimize::Config::default() };
    let report = optimize_model(&mut mesh, &cfg)?;
    export_mesh_binary(output, &mesh, header.compression_version != 0)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "acmr {:.3} -> {:.3}, cache hit {:.1}% -> {:.1}%",
            report.before.acmr, report.after.acmr, report.before.hit_percent, report.after.hit_percent
        );
    }
    Ok(())
}
