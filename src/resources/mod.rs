//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the world and
//! accessed by the preload systems: loader bookkeeping, the bridges to the
//! background threads, collaborators, configuration, and stores.
//!
//! Overview
//! - `audio` – bridge and channels for the background audio thread
//! - `audiomanager` – sound playback backends behind one trait
//! - `devlogger` – bounded developer message log with subscribers
//! - `fontprobe` – font availability checks polled by font watches
//! - `imageloader` – bridge to the background image thread and image sources
//! - `imagestore` – fetched image bytes keyed by URL
//! - `manifest` – JSON description of what to preload
//! - `preloadconfig` – INI-backed settings
//! - `resourceloader` – counts of registered and completed resources
//! - `stylesheet` – image discovery in CSS files
//! - `worldtime` – simulation time and delta
pub mod audio;
pub mod audiomanager;
pub mod devlogger;
pub mod fontprobe;
pub mod imageloader;
pub mod imagestore;
pub mod manifest;
pub mod preloadconfig;
pub mod resourceloader;
pub mod stylesheet;
pub mod worldtime;
