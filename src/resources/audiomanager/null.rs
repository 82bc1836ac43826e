use super::{AudioHandler, AudioManager, PlayOptions};

/// Backend that plays no sounds.
///
/// Used when no audio is configured so that preloading still completes:
/// `on_ready` and `preload` invoke their handlers right away.
#[derive(Debug, Default)]
pub struct NullAudioManager;

impl NullAudioManager {
    pub fn new() -> Self {
        NullAudioManager
    }
}

impl AudioManager for NullAudioManager {
    fn on_ready(&mut self, handler: AudioHandler) {
        handler();
    }

    fn preload(&mut self, _sound_name: &str, on_loaded: Option<AudioHandler>) {
        if let Some(handler) = on_loaded {
            handler();
        }
    }

    fn play_with_options(&mut self, _sound_name: &str, _options: &PlayOptions) {}
    fn pause(&mut self, _sound_name: &str) {}
    fn unpause(&mut self, _sound_name: &str) {}
    fn stop(&mut self, _sound_name: &str) {}
    fn stop_all(&mut self) {}
    fn unload(&mut self, _sound_name: &str) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn set_mute(&mut self, _muted: bool) {}
}
