//! ECS resources that bridge the world with the background audio thread.
//!
//! Use [`setup_audio`] once during initialization to move an
//! [`AudioManager`] onto its own thread and insert the [`AudioBridge`].
//! Call [`shutdown_audio`] during teardown to stop the thread.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::resources::audiomanager::AudioManager;
use crate::systems::audio::audio_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;

/// Shared bridge between the ECS world and the audio thread.
///
/// This resource is created by [`setup_audio`]. Systems send commands via
/// [`AudioBridge::send`] and poll for messages via [`AudioBridge::rx_msg`].
#[derive(Resource)]
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (ECS -> audio thread).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (audio thread -> ECS).
    pub rx_msg: Receiver<AudioMessage>,
    /// Join handle for the background audio thread.
    pub handle: std::thread::JoinHandle<()>,
    /// Set once the backend reported [`AudioMessage::Ready`].
    pub ready: bool,
}

impl AudioBridge {
    pub fn send(&self, cmd: AudioCmd) {
        if self.tx_cmd.send(cmd).is_err() {
            warn!("[audio] thread is gone; command dropped");
        }
    }
}

/// Spawn the audio thread running `manager` and register the bridge.
pub fn setup_audio(world: &mut World, manager: Box<dyn AudioManager>) {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let (tx_msg, rx_msg) = unbounded::<AudioMessage>();

    let handle = std::thread::spawn(move || audio_thread(manager, rx_cmd, tx_msg));

    world.insert_resource(AudioBridge {
        tx_cmd,
        rx_msg,
        handle,
        ready: false,
    });
}

/// Gracefully request shutdown of the audio thread and join it.
///
/// If the bridge resource exists, sends [`AudioCmd::Shutdown`], waits for the
/// thread to exit, and removes the resource from the world.
pub fn shutdown_audio(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<AudioBridge>() {
        let _ = bridge.tx_cmd.send(AudioCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}
