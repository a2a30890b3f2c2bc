//! Scene description for roomcrate
//!
//! This crate turns a room layout into a renderer-agnostic scene:
//! - Box furniture, walls and a floor plane with their materials
//! - The fixed lighting rig and the floorplan grid
//! - An orbit camera with perspective and floorplan presets
//! - Ray picking against furniture
//! - Baking the whole room into one triangle mesh

pub mod config;
pub mod builders;
pub mod camera;
pub mod picking;
pub mod room;

pub use config::*;
pub use builders::*;
pub use camera::*;
pub use picking::*;
pub use room::*;
