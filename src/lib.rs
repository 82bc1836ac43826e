//! Preloadkit library.
//!
//! Preloads images, fonts, and sounds with progress reporting, on top of a
//! `bevy_ecs` world. Also exposes the sound playback backends, weighted
//! sampling, and small random and text helpers.

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
pub mod util;
