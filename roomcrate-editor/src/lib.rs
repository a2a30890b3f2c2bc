//! Room layout editor
//!
//! [`Editor`] owns a layout (walls, furniture, floor and wall finish), the
//! current selection and interaction mode, and a [`RoomScene`] that is kept in
//! step with every change. Pointer input is fed in client pixels against a
//! [`Viewport`].
//!
//! [`RoomScene`]: roomcrate_scene::RoomScene
//! [`Viewport`]: roomcrate_scene::Viewport

pub mod config;
pub mod editor;
pub mod pointer;

pub use config::*;
pub use editor::*;
