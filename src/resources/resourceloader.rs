//! Resource preloading state.
//!
//! [`ResourceLoader`] is the bookkeeping half of the preloader: it records
//! which images, fonts, and sounds must be loaded and counts completions.
//! The driving half lives in [`crate::systems::preload`], which issues the
//! loads and turns each [`Completion`] into preload events.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --begin()--> Loading --last completion--> Done
//! ```
//!
//! - `Idle` accepts `add_*` calls.
//! - `Loading` accepts completions of any kind, in any order.
//! - `Done` is terminal; further completions are ignored.

use crate::error::PreloadError;
use crate::resources::manifest::ResourceManifest;
use crate::resources::stylesheet::StylesheetScanner;
use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoaderState {
    #[default]
    Idle,
    Loading,
    Done,
}

/// Kind of a preloaded resource, used for logging and image sequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Font,
    Sound,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Image => "image",
            ResourceKind::Font => "font",
            ResourceKind::Sound => "sound",
        };
        f.write_str(name)
    }
}

/// What a completion means for the preload events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Still loading; emit a progress event with this percentage.
    Progress(f32),
    /// Everything has loaded; emit the done event, preceded by a final
    /// progress event at 100 when `emit_progress` is set.
    Finished { emit_progress: bool },
    /// Nothing to report.
    Ignored,
}

/// Preloading bookkeeping for one batch of resources.
///
/// Invariant: `0 <= unloaded <= total`.
#[derive(Resource, Debug, Clone)]
pub struct ResourceLoader {
    total: usize,
    unloaded: usize,
    images: Vec<String>,
    image_set: FxHashSet<String>,
    /// Images not yet handed to the image thread.
    pending_images: VecDeque<String>,
    /// Serial mode only: the URL of the outstanding image fetch.
    image_in_flight: Option<String>,
    fonts: Vec<String>,
    sounds: Vec<String>,
    sounds_issued: bool,
    done_loading: bool,
    state: LoaderState,
    load_images_in_parallel: bool,
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ResourceLoader {
    /// Create an empty loader. With `load_images_in_parallel` every image
    /// fetch is issued at once; otherwise one image loads at a time.
    pub fn new(load_images_in_parallel: bool) -> Self {
        Self {
            total: 0,
            unloaded: 0,
            images: Vec::new(),
            image_set: FxHashSet::default(),
            pending_images: VecDeque::new(),
            image_in_flight: None,
            fonts: Vec::new(),
            sounds: Vec::new(),
            sounds_issued: false,
            done_loading: false,
            state: LoaderState::Idle,
            load_images_in_parallel,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn unloaded(&self) -> usize {
        self.unloaded
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn fonts(&self) -> &[String] {
        &self.fonts
    }

    pub fn sounds(&self) -> &[String] {
        &self.sounds
    }

    pub fn loads_images_in_parallel(&self) -> bool {
        self.load_images_in_parallel
    }

    /// True once the done event has been emitted.
    pub fn is_done(&self) -> bool {
        self.done_loading
    }

    /// Share of registered resources already loaded, `0.0..=100.0`.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.total - self.unloaded) as f32 / self.total as f32 * 100.0
    }

    fn ensure_idle(&self, action: &str) -> Result<(), PreloadError> {
        if self.state != LoaderState::Idle {
            return Err(PreloadError::invalid_state(format!(
                "cannot {} while the loader is {:?}",
                action, self.state
            )));
        }
        Ok(())
    }

    /// Register an image URL. Empty and already registered URLs are ignored;
    /// returns whether the URL was added.
    pub fn add_image(&mut self, url: &str) -> Result<bool, PreloadError> {
        self.ensure_idle("add an image")?;
        if url.is_empty() || self.image_set.contains(url) {
            return Ok(false);
        }
        self.total += 1;
        self.unloaded += 1;
        self.image_set.insert(url.to_string());
        self.images.push(url.to_string());
        Ok(true)
    }

    /// Register a font family. Fonts are not de-duplicated.
    pub fn add_font(&mut self, family: &str) -> Result<(), PreloadError> {
        self.ensure_idle("add a font")?;
        self.total += 1;
        self.unloaded += 1;
        self.fonts.push(family.to_string());
        Ok(())
    }

    /// Register a sound name. Sounds are not de-duplicated.
    pub fn add_sound(&mut self, name: &str) -> Result<(), PreloadError> {
        self.ensure_idle("add a sound")?;
        self.total += 1;
        self.unloaded += 1;
        self.sounds.push(name.to_string());
        Ok(())
    }

    /// Register every resource named in `manifest`.
    ///
    /// Stylesheets and selectors are expanded into image URLs through
    /// `scanner`; without a scanner they are skipped. Empty font and sound
    /// names are skipped.
    pub fn add_resource_manifest(
        &mut self,
        manifest: &ResourceManifest,
        scanner: Option<&dyn StylesheetScanner>,
    ) -> Result<(), PreloadError> {
        self.ensure_idle("add a manifest")?;

        match scanner {
            Some(scanner) => {
                for sheet in &manifest.stylesheets {
                    for url in scanner.stylesheet_images(sheet) {
                        self.add_image(&url)?;
                    }
                }
                for selector in &manifest.selectors {
                    for url in scanner.selector_images(selector) {
                        self.add_image(&url)?;
                    }
                }
            }
            None => {
                if !manifest.stylesheets.is_empty() || !manifest.selectors.is_empty() {
                    debug!("No stylesheet scanner; skipping stylesheet and selector images");
                }
            }
        }

        for url in &manifest.images {
            self.add_image(url)?;
        }
        for family in manifest.fonts.iter().filter(|f| !f.is_empty()) {
            self.add_font(family)?;
        }
        for sound in manifest.sounds.iter().filter(|s| !s.is_empty()) {
            self.add_sound(sound)?;
        }
        Ok(())
    }

    /// Move from `Idle` to `Loading` and queue every image for fetching.
    pub fn begin(&mut self) -> Result<(), PreloadError> {
        self.ensure_idle("start loading")?;
        self.state = LoaderState::Loading;
        self.pending_images = self.images.iter().cloned().collect();
        Ok(())
    }

    /// Image URLs to fetch now.
    ///
    /// In parallel mode this drains every queued image. In serial mode it
    /// yields one image, and nothing more until that image completes.
    pub fn next_image_fetches(&mut self) -> Vec<String> {
        if self.state != LoaderState::Loading {
            return Vec::new();
        }
        if self.load_images_in_parallel {
            return self.pending_images.drain(..).collect();
        }
        if self.image_in_flight.is_some() {
            return Vec::new();
        }
        match self.pending_images.pop_front() {
            Some(url) => {
                self.image_in_flight = Some(url.clone());
                vec![url]
            }
            None => Vec::new(),
        }
    }

    /// Sounds to hand to the audio backend once it is ready. Yields the
    /// registered sounds the first time it is called while loading.
    pub fn take_sounds_to_preload(&mut self) -> Vec<String> {
        if self.state != LoaderState::Loading || self.sounds_issued {
            return Vec::new();
        }
        self.sounds_issued = true;
        self.sounds.clone()
    }

    /// Record that one resource finished loading, successfully or not.
    pub fn loaded_resource(&mut self, kind: ResourceKind, name: &str) -> Completion {
        if kind == ResourceKind::Image && self.image_in_flight.as_deref() == Some(name) {
            self.image_in_flight = None;
        }
        match self.state {
            LoaderState::Idle => {
                warn!("Ignoring {} '{}' completed before loading started", kind, name);
                Completion::Ignored
            }
            LoaderState::Done => {
                debug!("Ignoring {} '{}' completed after loading finished", kind, name);
                Completion::Ignored
            }
            LoaderState::Loading => {
                self.unloaded = self.unloaded.saturating_sub(1);
                debug!(
                    "Loaded {} '{}' ({} of {} remaining)",
                    kind, name, self.unloaded, self.total
                );
                if self.unloaded == 0 {
                    self.finish(true)
                } else {
                    Completion::Progress(self.percent())
                }
            }
        }
    }

    /// Finish immediately if nothing is left to load. Used right after
    /// [`ResourceLoader::begin`] so an empty loader reports done without
    /// any progress event.
    pub fn maybe_finish_loading(&mut self) -> Completion {
        if self.state == LoaderState::Loading && self.unloaded == 0 {
            self.finish(false)
        } else {
            Completion::Ignored
        }
    }

    fn finish(&mut self, emit_progress: bool) -> Completion {
        if self.done_loading {
            return Completion::Ignored;
        }
        self.done_loading = true;
        self.state = LoaderState::Done;
        Completion::Finished { emit_progress }
    }
}
