//! Commands and messages exchanged with the background audio thread.

use crate::resources::audiomanager::PlayOptions;

/// Commands sent *to* the audio thread.
#[derive(Debug, Clone)]
pub enum AudioCmd {
    Preload { id: String },
    Play { id: String, options: PlayOptions },
    Pause { id: String },
    Unpause { id: String },
    Stop { id: String },
    StopAll,
    Unload { id: String },
    /// Global volume in `[0, 1]`.
    SetVolume { vol: f32 },
    SetMute { muted: bool },
    Shutdown,
}

/// Messages sent *back* from the audio thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMessage {
    /// The backend finished initializing and accepts preloads.
    Ready,
    /// A preload handler fired for the sound. Backends report failed reads
    /// here as well so preloading never stalls.
    SoundLoaded { id: String },
}
