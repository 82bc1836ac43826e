//! Sound playback backends.
//!
//! Every backend implements [`AudioManager`]. A backend is chosen once, at
//! construction, from [`AudioBackend`] and then moved onto the audio thread
//! (see [`crate::resources::audio::setup_audio`]). The preloader only relies
//! on [`AudioManager::on_ready`] and [`AudioManager::preload`].
//!
//! Backends:
//! - [`NullAudioManager`] – plays nothing; every handler fires right away
//! - [`StreamingAudioManager`] – desktop backend keeping sounds in memory
//! - [`NativeAudioManager`] – mobile backend tracking native media handles

mod native;
mod null;
mod streaming;

pub use native::NativeAudioManager;
pub use null::NullAudioManager;
pub use streaming::StreamingAudioManager;

use std::fmt;
use std::str::FromStr;

/// Callback invoked by a backend when it becomes ready or a sound loads.
pub type AudioHandler = Box<dyn FnOnce() + Send + 'static>;

/// Flags accepted by [`AudioManager::play_with_options`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayOptions {
    /// Stop any playing sounds before starting this one.
    pub stop_all: bool,
    /// Do nothing if this sound is already playing.
    pub ignore_if_playing: bool,
    /// With `stop_all`, fade the old sounds out first.
    pub fade_out: bool,
    pub fade_in: bool,
    pub looping: bool,
    /// Play at this volume, `0.0` mute to `1.0` full.
    pub volume: Option<f32>,
}

/// Playback state of one sound handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Capability set shared by all sound backends.
pub trait AudioManager: Send {
    /// Call `handler` once the backend is ready. Backends that are already
    /// initialized call it immediately.
    fn on_ready(&mut self, handler: AudioHandler);

    /// Load `sound_name` without playing it. `on_loaded` fires once the
    /// sound is available, or once the backend gives up on it.
    fn preload(&mut self, sound_name: &str, on_loaded: Option<AudioHandler>);

    /// Shorthand for [`AudioManager::play_with_options`] with only the two
    /// most common flags.
    fn play(&mut self, sound_name: &str, stop_all: bool, ignore_if_playing: bool) {
        let options = PlayOptions {
            stop_all,
            ignore_if_playing,
            ..PlayOptions::default()
        };
        self.play_with_options(sound_name, &options);
    }

    fn play_with_options(&mut self, sound_name: &str, options: &PlayOptions);

    fn pause(&mut self, sound_name: &str);

    /// Resume a paused sound. No action if it is not paused.
    fn unpause(&mut self, sound_name: &str);

    fn stop(&mut self, sound_name: &str);

    fn stop_all(&mut self);

    /// Drop every reference to the sound and release its data.
    fn unload(&mut self, sound_name: &str);

    /// Global volume, `0.0` mute to `1.0` full.
    fn set_volume(&mut self, volume: f32);

    fn set_mute(&mut self, muted: bool);
}

/// Which [`AudioManager`] implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioBackend {
    #[default]
    Null,
    Streaming,
    Native,
}

impl fmt::Display for AudioBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioBackend::Null => "null",
            AudioBackend::Streaming => "streaming",
            AudioBackend::Native => "native",
        };
        f.write_str(name)
    }
}

impl FromStr for AudioBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" | "none" => Ok(AudioBackend::Null),
            "streaming" | "desktop" => Ok(AudioBackend::Streaming),
            "native" | "mobile" => Ok(AudioBackend::Native),
            other => Err(format!("unknown audio backend '{}'", other)),
        }
    }
}

/// Build the backend selected by `backend`.
///
/// `sound_path` and `extension` override the backend's defaults; they are
/// ignored by [`NullAudioManager`].
pub fn create_audio_manager(
    backend: AudioBackend,
    sound_path: Option<&str>,
    extension: Option<&str>,
) -> Box<dyn AudioManager> {
    match backend {
        AudioBackend::Null => Box::new(NullAudioManager::new()),
        AudioBackend::Streaming => {
            let mut manager = StreamingAudioManager::new(sound_path);
            if let Some(ext) = extension {
                manager.set_extension(ext);
            }
            Box::new(manager)
        }
        AudioBackend::Native => {
            let mut manager = NativeAudioManager::new(sound_path);
            if let Some(ext) = extension {
                manager.set_extension(ext);
            }
            Box::new(manager)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("null".parse::<AudioBackend>(), Ok(AudioBackend::Null));
        assert_eq!(" Desktop ".parse::<AudioBackend>(), Ok(AudioBackend::Streaming));
        assert_eq!("native".parse::<AudioBackend>(), Ok(AudioBackend::Native));
        assert!("flash".parse::<AudioBackend>().is_err());
    }

    #[test]
    fn test_backend_display_round_trips() {
        for backend in [AudioBackend::Null, AudioBackend::Streaming, AudioBackend::Native] {
            assert_eq!(backend.to_string().parse::<AudioBackend>(), Ok(backend));
        }
    }
}
