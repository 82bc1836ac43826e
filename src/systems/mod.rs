//! Preload systems.
//!
//! Submodules overview
//! - [`audio`] – audio thread and polling of its messages
//! - [`devlog`] – observers mirroring preload events into the dev log
//! - [`fontwatch`] – poll pending fonts until they load or time out
//! - [`images`] – image thread and polling of fetched images
//! - [`preload`] – start, drive, and finish a preload; event emission
//! - [`time`] – update simulation time and delta

pub mod audio;
pub mod devlog;
pub mod fontwatch;
pub mod images;
pub mod preload;
pub mod time;
