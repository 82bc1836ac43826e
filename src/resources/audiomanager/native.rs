//! Mobile backend.
//!
//! Native media handles are created per sound from `root + name + extension`
//! and need no download step, so `preload` reports loaded immediately. The
//! backend tracks which sounds are playing and which are paused; like the
//! desktop backend it keeps state only and produces no audio output.

use super::{AudioHandler, AudioManager, PlayOptions};
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;

const DEFAULT_ROOT: &str = "static/sounds/";
const DEFAULT_EXTENSION: &str = ".aiff";

/// Backend for mobile hosts playing sounds through native media handles.
#[derive(Debug)]
pub struct NativeAudioManager {
    sounds: FxHashMap<String, PathBuf>,
    playing: FxHashSet<String>,
    paused: FxHashSet<String>,
    root: String,
    extension: String,
    volume: f32,
    muted: bool,
}

impl Default for NativeAudioManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl NativeAudioManager {
    pub fn new(root: Option<&str>) -> Self {
        Self {
            sounds: FxHashMap::default(),
            playing: FxHashSet::default(),
            paused: FxHashSet::default(),
            root: root.unwrap_or(DEFAULT_ROOT).to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            volume: 1.0,
            muted: false,
        }
    }

    /// Override the extension; a leading dot is added if missing.
    pub fn set_extension(&mut self, extension: &str) {
        self.extension = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };
    }

    pub fn media_path(&self, sound_name: &str) -> PathBuf {
        PathBuf::from(format!("{}{}{}", self.root, sound_name, self.extension))
    }

    pub fn is_loaded(&self, sound_name: &str) -> bool {
        self.sounds.contains_key(sound_name)
    }

    pub fn is_playing(&self, sound_name: &str) -> bool {
        self.playing.contains(sound_name)
    }

    pub fn is_paused(&self, sound_name: &str) -> bool {
        self.paused.contains(sound_name)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn ensure_media(&mut self, sound_name: &str) {
        if !self.sounds.contains_key(sound_name) {
            let path = self.media_path(sound_name);
            self.sounds.insert(sound_name.to_string(), path);
        }
    }
}

impl AudioManager for NativeAudioManager {
    fn on_ready(&mut self, handler: AudioHandler) {
        // Native media APIs are available as soon as the host starts.
        handler();
    }

    fn preload(&mut self, sound_name: &str, on_loaded: Option<AudioHandler>) {
        self.ensure_media(sound_name);
        debug!(
            "[audio] native media id='{}' path='{}'",
            sound_name,
            self.media_path(sound_name).display()
        );
        // Native download callbacks are unreliable; report loaded right away.
        if let Some(handler) = on_loaded {
            handler();
        }
    }

    fn play_with_options(&mut self, sound_name: &str, options: &PlayOptions) {
        if self.muted {
            return;
        }
        if options.ignore_if_playing && self.playing.contains(sound_name) {
            return;
        }
        self.ensure_media(sound_name);
        if options.stop_all {
            self.stop_all();
        } else if self.paused.contains(sound_name) {
            // Restart from the beginning rather than resuming.
            self.stop(sound_name);
        }
        self.playing.insert(sound_name.to_string());
    }

    fn pause(&mut self, sound_name: &str) {
        if self.sounds.contains_key(sound_name) {
            self.playing.remove(sound_name);
            self.paused.insert(sound_name.to_string());
        }
    }

    fn unpause(&mut self, sound_name: &str) {
        if self.paused.remove(sound_name) {
            self.playing.insert(sound_name.to_string());
        }
    }

    fn stop(&mut self, sound_name: &str) {
        if self.sounds.contains_key(sound_name) {
            self.paused.remove(sound_name);
            self.playing.remove(sound_name);
        }
    }

    fn stop_all(&mut self) {
        self.paused.clear();
        self.playing.clear();
    }

    fn unload(&mut self, sound_name: &str) {
        if self.sounds.remove(sound_name).is_some() {
            self.paused.remove(sound_name);
            self.playing.remove(sound_name);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_mute(&mut self, muted: bool) {
        if muted {
            self.stop_all();
        }
        self.muted = muted;
    }
}
