//! Audio thread and the system bridging it with the world.
//!
//! - [`audio_thread`] runs on its own OS thread, owns the
//!   [`AudioManager`] backend, and processes
//!   [`AudioCmd`](crate::events::audio::AudioCmd) messages, answering with
//!   [`AudioMessage`](crate::events::audio::AudioMessage)s.
//! - [`poll_audio_messages`] drains those answers every tick: `Ready` hands
//!   the pending sound preloads to the thread, `SoundLoaded` counts one
//!   completed resource.
//!
//! The thread must be created via [`crate::resources::audio::setup_audio`]
//! and stopped via [`crate::resources::audio::shutdown_audio`].

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::resources::audio::AudioBridge;
use crate::resources::audiomanager::AudioManager;
use crate::resources::resourceloader::{ResourceKind, ResourceLoader};
use crate::systems::preload::emit_completion;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};

/// Entry point of the dedicated audio thread.
///
/// Registers a ready handler with the backend, then blocks on commands
/// until [`AudioCmd::Shutdown`] arrives or every sender is dropped. Preload
/// handlers report back as [`AudioMessage::SoundLoaded`].
pub fn audio_thread(
    mut manager: Box<dyn AudioManager>,
    rx_cmd: Receiver<AudioCmd>,
    tx_msg: Sender<AudioMessage>,
) {
    info!(
        "[audio] thread starting (id={:?})",
        std::thread::current().id()
    );

    let tx_ready = tx_msg.clone();
    manager.on_ready(Box::new(move || {
        let _ = tx_ready.send(AudioMessage::Ready);
    }));

    for cmd in rx_cmd.iter() {
        match cmd {
            AudioCmd::Preload { id } => {
                debug!("[audio] preload id='{}'", id);
                let tx = tx_msg.clone();
                let loaded = id.clone();
                manager.preload(
                    &id,
                    Some(Box::new(move || {
                        let _ = tx.send(AudioMessage::SoundLoaded { id: loaded });
                    })),
                );
            }
            AudioCmd::Play { id, options } => manager.play_with_options(&id, &options),
            AudioCmd::Pause { id } => manager.pause(&id),
            AudioCmd::Unpause { id } => manager.unpause(&id),
            AudioCmd::Stop { id } => manager.stop(&id),
            AudioCmd::StopAll => manager.stop_all(),
            AudioCmd::Unload { id } => manager.unload(&id),
            AudioCmd::SetVolume { vol } => manager.set_volume(vol),
            AudioCmd::SetMute { muted } => manager.set_mute(muted),
            AudioCmd::Shutdown => {
                manager.stop_all();
                break;
            }
        }
    }

    info!("[audio] thread exiting");
}

/// Hand every registered sound to the audio thread, once per load.
pub(crate) fn issue_sound_preloads(loader: &mut ResourceLoader, bridge: &AudioBridge) {
    for id in loader.take_sounds_to_preload() {
        bridge.send(AudioCmd::Preload { id });
    }
}

/// Drain messages from the audio thread.
///
/// Non-blocking; intended to run every tick on the main thread.
pub fn poll_audio_messages(
    mut commands: Commands,
    bridge: Option<ResMut<AudioBridge>>,
    mut loader: Option<ResMut<ResourceLoader>>,
) {
    let Some(mut bridge) = bridge else {
        return;
    };
    let messages: Vec<AudioMessage> = bridge.rx_msg.try_iter().collect();
    for msg in messages {
        match msg {
            AudioMessage::Ready => {
                debug!("[audio] backend ready");
                bridge.ready = true;
                if let Some(loader) = loader.as_deref_mut() {
                    issue_sound_preloads(loader, &bridge);
                }
            }
            AudioMessage::SoundLoaded { id } => {
                if let Some(loader) = loader.as_deref_mut() {
                    let completion = loader.loaded_resource(ResourceKind::Sound, &id);
                    emit_completion(&mut commands, completion);
                }
            }
        }
    }
}
