//! Core data structures and traits for roomcrate
//! 
//! This crate provides the fundamental types shared by the converter and the
//! room editor: the layout model (walls, furniture, projects), colors and
//! materials, triangle meshes, transforms and the common error type.

pub mod point;
pub mod layout;
pub mod color;
pub mod material;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use layout::*;
pub use color::*;
pub use material::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, UnitQuaternion};

// Type aliases for easier imports
pub type Point = Point3f;
pub type Mesh = TriangleMesh;
