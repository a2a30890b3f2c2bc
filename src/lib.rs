//! # roomcrate
//!
//! Room layout editing and legacy 3D model conversion for Rust.
//!
//! This is the umbrella crate that provides convenient access to all roomcrate functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Layout model (walls, furniture, projects), colors, materials and meshes
//! - **I/O**: Legacy three.js JSON to glTF conversion and project persistence
//! - **Scene**: Renderer-agnostic room scenes, orbit camera and picking
//! - **Editor**: The room editor state machine
//!
//! ## Quick Start
//!
//! ```rust
//! use roomcrate::prelude::*;
//!
//! let mut editor = Editor::default();
//! let id = editor.add_furniture(furniture_type("Chair").unwrap());
//! editor.select_item(Some(id));
//!
//! let mut store = MemoryStore::new();
//! assert_eq!(editor.save_project(&mut store), Notice::Saved);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io, scene and editor
//! - `io`: Model conversion and project storage
//! - `scene`: Room scene description
//! - `editor`: Editor state (pulls in `io` and `scene`)
//! - `all`: Enables all features

// Re-export core functionality
pub use roomcrate_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use roomcrate_io as io;

#[cfg(feature = "scene")]
pub use roomcrate_scene as scene;

#[cfg(feature = "editor")]
pub use roomcrate_editor as editor;

/// Convenient imports for common use cases
pub mod prelude {
    pub use roomcrate_core::*;

    #[cfg(feature = "io")]
    pub use roomcrate_io::{
        convert_file, convert_str, load_project, save_project, ConvertOptions, FileStore, GltfDocument,
        GltfExporter, KeyValueStore, MemoryStore,
    };

    #[cfg(feature = "scene")]
    pub use roomcrate_scene::{OrbitCamera, Ray, RoomScene, SceneConfig, Viewport};

    #[cfg(feature = "editor")]
    pub use roomcrate_editor::{Dimension, Editor, EditorConfig, FurnitureUpdate, Notice, SidebarTab};
}
