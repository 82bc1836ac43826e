//! Preload lifecycle events.
//!
//! These are triggered on the world while a
//! [`ResourceLoader`](crate::resources::resourceloader::ResourceLoader) runs.
//! Register observers to follow progress:
//!
//! ```ignore
//! world.add_observer(|trigger: On<PreloadProgress>| {
//!     println!("{:.0}%", trigger.event().percent);
//! });
//! ```
//!
//! Ordering guarantees:
//! - [`PreloadStarted`] precedes every other preload event.
//! - [`PreloadProgress`] percentages never decrease; the last one is exactly 100.
//! - [`PreloadDone`] fires exactly once, after the final progress event. An
//!   empty loader emits it straight after [`PreloadStarted`] with no progress.

use bevy_ecs::prelude::*;

/// Emitted once when `start_preload` begins issuing loads.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PreloadStarted;

/// Emitted after every completed resource.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PreloadProgress {
    /// Share of registered resources already loaded, `0.0..=100.0`.
    pub percent: f32,
}

/// Emitted once every registered resource has reported loaded.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PreloadDone;
