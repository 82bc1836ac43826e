//! ECS components for entities.
//!
//! - [`fontwatch`] – per-font polling state while a font family loads

pub mod fontwatch;
