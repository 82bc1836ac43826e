//! Event and message types used by the preloader.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`image`] – commands and messages for the background image thread
//! - [`preload`] – lifecycle events observed by the host (started, progress, done)
pub mod audio;
pub mod image;
pub mod preload;
