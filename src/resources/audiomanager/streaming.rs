//! Desktop backend.
//!
//! A state-tracking backend: it records playback state and volumes and
//! holds preloaded file bytes, but never outputs sound.
//!
//! Sound files live under a sound path and share one extension; the URL of
//! a sound is `sound_path + name + "." + extension`. Preloading reads the
//! whole file into memory. Volumes are kept on a 0–100 scale.

use super::{AudioHandler, AudioManager, PlaybackState, PlayOptions};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

const DEFAULT_SOUND_PATH: &str = "static/sounds/";
const DEFAULT_EXTENSION: &str = "mp3";
const FULL_VOLUME: u32 = 100;

#[derive(Debug)]
struct StreamedSound {
    url: PathBuf,
    data: Option<Vec<u8>>,
    state: PlaybackState,
    volume: u32,
    muted: bool,
    looping: bool,
}

/// Backend for desktop hosts that keeps preloaded sound data in memory.
#[derive(Debug)]
pub struct StreamingAudioManager {
    sounds: FxHashMap<String, StreamedSound>,
    sound_path: String,
    extension: String,
    volume: u32,
    muted: bool,
}

impl Default for StreamingAudioManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl StreamingAudioManager {
    /// Create a backend reading from `sound_path`, or `static/sounds/`.
    pub fn new(sound_path: Option<&str>) -> Self {
        Self {
            sounds: FxHashMap::default(),
            sound_path: sound_path.unwrap_or(DEFAULT_SOUND_PATH).to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            volume: FULL_VOLUME,
            muted: false,
        }
    }

    /// Override the file extension used for sounds created from now on.
    pub fn set_extension(&mut self, extension: &str) {
        self.extension = extension.trim_start_matches('.').to_string();
    }

    pub fn sound_url(&self, sound_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}{}.{}",
            self.sound_path, sound_name, self.extension
        ))
    }

    pub fn state(&self, sound_name: &str) -> Option<PlaybackState> {
        self.sounds.get(sound_name).map(|s| s.state)
    }

    /// Volume of one sound on the 0–100 scale.
    pub fn sound_volume(&self, sound_name: &str) -> Option<u32> {
        self.sounds.get(sound_name).map(|s| s.volume)
    }

    pub fn is_loaded(&self, sound_name: &str) -> bool {
        self.sounds
            .get(sound_name)
            .is_some_and(|s| s.data.is_some())
    }

    pub fn is_looping(&self, sound_name: &str) -> bool {
        self.sounds.get(sound_name).is_some_and(|s| s.looping)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Global volume on the 0–100 scale.
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Cached sound handle, created on first use.
    fn get_sound(&mut self, sound_name: &str) -> &mut StreamedSound {
        let url = self.sound_url(sound_name);
        let volume = self.volume;
        let muted = self.muted;
        self.sounds
            .entry(sound_name.to_string())
            .or_insert_with(|| StreamedSound {
                url,
                data: None,
                state: PlaybackState::Stopped,
                volume,
                muted,
                looping: false,
            })
    }
}

impl AudioManager for StreamingAudioManager {
    fn on_ready(&mut self, handler: AudioHandler) {
        info!("[audio] streaming backend ready (path='{}')", self.sound_path);
        handler();
    }

    fn preload(&mut self, sound_name: &str, on_loaded: Option<AudioHandler>) {
        let sound = self.get_sound(sound_name);
        if sound.data.is_none() {
            match std::fs::read(&sound.url) {
                Ok(bytes) => {
                    debug!(
                        "[audio] preloaded id='{}' path='{}' bytes={}",
                        sound_name,
                        sound.url.display(),
                        bytes.len()
                    );
                    sound.data = Some(bytes);
                }
                Err(e) => {
                    // Counted as loaded anyway so the preload never stalls.
                    warn!(
                        "[audio] preload failed id='{}' path='{}' error='{}'",
                        sound_name,
                        sound.url.display(),
                        e
                    );
                }
            }
        }
        if let Some(handler) = on_loaded {
            handler();
        }
    }

    fn play_with_options(&mut self, sound_name: &str, options: &PlayOptions) {
        if self.muted {
            return;
        }
        if options.ignore_if_playing && self.state(sound_name) == Some(PlaybackState::Playing) {
            return;
        }
        if options.stop_all {
            self.stop_all();
        }
        let global_volume = self.volume;
        let sound = self.get_sound(sound_name);
        sound.volume = match options.volume {
            Some(v) => (v.clamp(0.0, 1.0) * FULL_VOLUME as f32).round() as u32,
            None => global_volume,
        };
        sound.looping = options.looping;
        sound.state = PlaybackState::Playing;
        debug!(
            "[audio] play id='{}' volume={} looped={}",
            sound_name, sound.volume, sound.looping
        );
    }

    fn pause(&mut self, sound_name: &str) {
        if let Some(sound) = self.sounds.get_mut(sound_name) {
            if sound.state == PlaybackState::Playing {
                sound.state = PlaybackState::Paused;
            }
        }
    }

    fn unpause(&mut self, sound_name: &str) {
        if let Some(sound) = self.sounds.get_mut(sound_name) {
            if sound.state == PlaybackState::Paused {
                sound.state = PlaybackState::Playing;
            }
        }
    }

    fn stop(&mut self, sound_name: &str) {
        if let Some(sound) = self.sounds.get_mut(sound_name) {
            sound.state = PlaybackState::Stopped;
        }
    }

    fn stop_all(&mut self) {
        for sound in self.sounds.values_mut() {
            sound.state = PlaybackState::Stopped;
        }
    }

    fn unload(&mut self, sound_name: &str) {
        if self.sounds.remove(sound_name).is_some() {
            debug!("[audio] unload id='{}'", sound_name);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = (volume.clamp(0.0, 1.0) * FULL_VOLUME as f32).round() as u32;
        for sound in self.sounds.values_mut() {
            sound.volume = self.volume;
        }
    }

    fn set_mute(&mut self, muted: bool) {
        for sound in self.sounds.values_mut() {
            sound.muted = muted;
            if muted {
                sound.state = PlaybackState::Stopped;
            }
        }
        self.muted = muted;
    }
}
