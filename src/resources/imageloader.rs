//! ECS resources bridging the world with the background image thread.
//!
//! Use [`setup_images`] once to spawn the image thread and insert the
//! [`ImageBridge`] resource, and [`shutdown_images`] during teardown. The
//! thread fetches bytes through an [`ImageSource`]; results come back as
//! [`ImageMessage`]s drained by
//! [`poll_image_messages`](crate::systems::images::poll_image_messages).

use crate::events::image::{ImageCmd, ImageMessage};
use crate::systems::images::image_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where image bytes come from.
pub trait ImageSource: Send + Sync {
    /// Fetch the image at `url`. Errors are reported as text; the preloader
    /// counts a failed image as loaded.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;
}

impl<F> ImageSource for F
where
    F: Fn(&str) -> Result<Vec<u8>, String> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        self(url)
    }
}

/// Reads images from a local directory. Query strings and fragments are
/// dropped and leading slashes are ignored, so `/img/a.png?v=2` reads
/// `root/img/a.png`.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        if url.contains("://") {
            return Err(format!("remote image '{}' is not fetchable from disk", url));
        }
        let path = self.resolve(url);
        std::fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

/// Shared bridge between the ECS world and the image thread.
#[derive(Resource)]
pub struct ImageBridge {
    /// Sender for [`ImageCmd`] messages (ECS -> image thread).
    pub tx_cmd: Sender<ImageCmd>,
    /// Receiver for [`ImageMessage`] messages (image thread -> ECS).
    pub rx_msg: Receiver<ImageMessage>,
    /// Join handle for the background image thread.
    pub handle: std::thread::JoinHandle<()>,
}

impl ImageBridge {
    /// Ask the image thread to fetch `url`.
    pub fn fetch(&self, url: impl Into<String>) {
        if self.tx_cmd.send(ImageCmd::Fetch { url: url.into() }).is_err() {
            warn!("[images] thread is gone; fetch dropped");
        }
    }
}

/// Spawn the image thread and register the [`ImageBridge`] resource.
pub fn setup_images(world: &mut World, source: Arc<dyn ImageSource>) {
    let (tx_cmd, rx_cmd) = unbounded::<ImageCmd>();
    let (tx_msg, rx_msg) = unbounded::<ImageMessage>();

    let handle = std::thread::spawn(move || image_thread(source, rx_cmd, tx_msg));

    world.insert_resource(ImageBridge {
        tx_cmd,
        rx_msg,
        handle,
    });
}

/// Request shutdown of the image thread and join it.
///
/// Fetches still in flight are allowed to finish; their results are
/// discarded with the bridge.
pub fn shutdown_images(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<ImageBridge>() {
        let _ = bridge.tx_cmd.send(ImageCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}
