use std::fs;
use std::path::PathBuf;

use meshpack::io::binary::import_mesh_binary_with;
use meshpack::optimize::{self, cache};
use meshpack::prelude::*;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("meshpack-pipeline-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

/// Every triangle as the attribute values of its corners, order-independent.
fn triangle_soup(mesh: &RuntimeMesh) -> Vec<[[u32; 6]; 3]> {
    let mut out = mesh.faces.iter()
        .map(|face| face.map(|v| {
            let p = mesh.vertices[v as usize].to_bits();
            let n = mesh.normals.get(v as usize).map_or([0; 3], |n| n.to_bits());
            [p[0], p[1], p[2], n[0], n[1], n[2]]
        }))
        .collect::<Vec<_>>();
    out.sort();
    out
}

#[test]
fn cube_deduplicates_to_24_vertices() {
    let meshes = import_model(data("cube.obj")).unwrap();
    assert_eq!(meshes.len(), 1);

    let cube = &meshes["cube"];
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.normals.len(), 24);
    assert_eq!(cube.indices().len(), 36);
    assert!(cube.texcoord0.is_empty());
    assert!(cube.colors.is_empty());
    assert!(cube.material.is_empty());
    assert_eq!(cube.validate(), Ok(()));
}

#[test]
fn cube_survives_optimize_export_import() {
    let mut cube = import_model(data("cube.obj")).unwrap().shift_remove("cube").unwrap();
    let soup = triangle_soup(&cube);

    let report = optimize_model(&mut cube, &optimize::Config::default()).unwrap();
    assert!(report.after.acmr <= report.before.acmr);
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(triangle_soup(&cube), soup);

    let path = scratch("cube.mesh");
    let header = export_mesh_binary(&path, &cube, false).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), BinaryHeader::SIZE as u64 + header.payload_len());
    assert_eq!(header.byte_count(MeshArray::Vertices), 24 * 12);
    assert_eq!(header.byte_count(MeshArray::Faces), 12 * 12);
    assert_eq!(header.byte_count(MeshArray::Materials), 0);

    let decoded = import_mesh_binary(&path).unwrap();
    assert_eq!(decoded, cube);

    // re-exporting the decoded mesh gives the same bytes
    let again = scratch("cube-again.mesh");
    export_mesh_binary(&again, &decoded, false).unwrap();
    assert_eq!(fs::read(&path).unwrap(), fs::read(&again).unwrap());
}

#[test]
fn same_named_shapes_merge_and_keep_materials() {
    let meshes = import_model(data("two_parts.obj")).unwrap();
    assert_eq!(meshes.keys().collect::<Vec<_>>(), vec!["left", "right"]);

    let left = &meshes["left"];
    assert_eq!(left.vertices.len(), 4);
    assert_eq!(left.faces, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(left.material, vec![1, 2]);

    let right = &meshes["right"];
    assert_eq!(right.faces.len(), 1);
    assert_eq!(right.material, vec![2]);
}

#[test]
fn material_names_follow_material_ids() {
    let model = import_model_with_materials(data("two_parts.obj")).unwrap();
    assert_eq!(model.materials, vec!["default", "red", "blue"]);
    assert_eq!(model.materials[model.meshes["right"].material[0] as usize], "blue");
}

#[test]
fn corners_without_normals_are_not_given_one() {
    let meshes = import_model(data("mixed_normals.obj")).unwrap();
    let mesh = &meshes["mixed"];

    // p2 and p3 appear with and without a normal, so they split
    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 4, 5]]);
    assert!(mesh.normals[..3].iter().all(|n| *n == Float3::from([0.0, 0.0, 0.0])));
    assert!(mesh.normals[3..].iter().all(|n| *n == Float3::from([0.0, 0.0, 1.0])));
}

#[test]
fn polygon_faces_are_malformed() {
    let err = import_model(data("quad.obj")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSource);
}

#[test]
fn unknown_extension_is_unsupported() {
    let err = import_model(data("cube.fbx")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

fn exported_cube(name: &str) -> (PathBuf, Vec<u8>) {
    let cube = import_model(data("cube.obj")).unwrap().shift_remove("cube").unwrap();
    let path = scratch(name);
    export_mesh_binary(&path, &cube, true).unwrap();
    let bytes = fs::read(&path).unwrap();
    (path, bytes)
}

fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn newer_container_version_is_rejected() {
    let (path, mut bytes) = exported_cube("future.mesh");
    patch_u32(&mut bytes, 0, 2);
    fs::write(&path, &bytes).unwrap();
    assert_eq!(import_mesh_binary(&path).unwrap_err().kind(), ErrorKind::VersionMismatch);
}

#[test]
fn unknown_compression_version_is_rejected() {
    let (path, mut bytes) = exported_cube("compression.mesh");
    assert_eq!(&bytes[4..8], &1_u32.to_le_bytes());
    patch_u32(&mut bytes, 4, 7);
    fs::write(&path, &bytes).unwrap();
    assert_eq!(import_mesh_binary(&path).unwrap_err().kind(), ErrorKind::VersionMismatch);
}

#[test]
fn truncated_containers_are_rejected() {
    let (path, bytes) = exported_cube("truncated.mesh");

    fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
    assert_eq!(import_mesh_binary(&path).unwrap_err().kind(), ErrorKind::TruncatedFile);

    fs::write(&path, &bytes[..10]).unwrap();
    assert_eq!(import_mesh_binary(&path).unwrap_err().kind(), ErrorKind::TruncatedFile);
}

#[test]
fn misaligned_byte_count_is_malformed() {
    let (path, mut bytes) = exported_cube("misaligned.mesh");
    // vertices byte count
    patch_u32(&mut bytes, 8, 24 * 12 + 1);
    fs::write(&path, &bytes).unwrap();
    assert_eq!(import_mesh_binary(&path).unwrap_err().kind(), ErrorKind::MalformedSource);
}

#[test]
fn strict_import_reports_bad_indices() {
    let mesh = RuntimeMesh {
        vertices: vec![Float3::from([0.0, 0.0, 0.0]); 3],
        faces: vec![[0, 1, 5]],
        ..RuntimeMesh::new()
    };
    let path = scratch("bad-index.mesh");
    export_mesh_binary(&path, &mesh, false).unwrap();

    assert_eq!(import_mesh_binary(&path).unwrap(), mesh);
    let err = import_mesh_binary_with(&path, &decode::Config { strict: true }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
}

#[test]
fn cache_statistics_of_the_cube() {
    let cube = import_model(data("cube.obj")).unwrap().shift_remove("cube").unwrap();
    let stats = cache::analyze_post_transform(&cube.indices(), cube.vertices.len(), 32);
    // every vertex misses exactly once when the cache holds the whole cube
    assert_eq!(stats.misses, 24);
    assert_eq!(stats.num_triangles, 12);
    assert_eq!(stats.acmr, 2.0);
    assert!((stats.hit_percent - 100.0 / 3.0).abs() < 1e-3);
}
