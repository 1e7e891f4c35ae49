pub mod bit_coder;
pub mod error;
pub mod mesh;
pub mod shared;
