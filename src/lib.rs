// lib.rs

/// Contains the interface between `RuntimeMesh` objects and files: source
/// formats such as obj, and the binary mesh container.
pub mod io;

/// Contains the container header shared by the encoder and the decoder.
pub mod shared;

/// Defines the mesh container encoder.
pub mod encode;

/// Defines the mesh container decoder.
pub mod decode;

/// Defines the vertex cache and vertex fetch optimizations.
pub mod optimize;

/// Contains the shared definitions, native objects, and the byte coders.
pub mod core;


/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::core::mesh::{RuntimeMesh, MeshArray, builder::{MeshBuilder, Corner}};
    pub use crate::core::shared::{NdVector, Float2, Float3, Face};
    pub use crate::core::shared::ConfigType;
    pub use crate::core::error::ErrorKind;
    pub use crate::core::bit_coder::{
        ByteReader,
        ByteWriter,
        SliceReader,
    };
    pub use crate::shared::header::BinaryHeader;
    pub use crate::io::{import_model, import_model_with_materials, ImportedModel, Importer, SourceAdapter, SourceAsset};
    pub use crate::io::binary::{export_mesh_binary, import_mesh_binary};
    pub use crate::optimize::{optimize_model, CacheStatistics, OptimizationReport};
    pub use crate::encode::{self, encode};
    pub use crate::decode::{self, decode};
}
