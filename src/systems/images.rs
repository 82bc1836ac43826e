//! Image thread and the system bridging it with the world.
//!
//! [`image_thread`] hands each [`ImageCmd::Fetch`] to a fixed pool of
//! worker threads, so parallel loading overlaps fetches without spawning
//! one thread per image. [`poll_image_messages`] stores fetched bytes,
//! counts each image as loaded whether or not the fetch succeeded, and in
//! serial mode issues the next fetch.

use crate::events::image::{ImageCmd, ImageMessage};
use crate::resources::imageloader::{ImageBridge, ImageSource};
use crate::resources::imagestore::ImageStore;
use crate::resources::resourceloader::{ResourceKind, ResourceLoader};
use crate::systems::preload::emit_completion;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Upper bound on concurrent fetches.
pub const MAX_IMAGE_WORKERS: usize = 4;

/// Entry point of the dedicated image thread.
///
/// Blocks on commands until [`ImageCmd::Shutdown`] or until every sender
/// is dropped, then waits for queued fetches to drain.
pub fn image_thread(
    source: Arc<dyn ImageSource>,
    rx_cmd: Receiver<ImageCmd>,
    tx_msg: Sender<ImageMessage>,
) {
    info!(
        "[images] thread starting (id={:?})",
        std::thread::current().id()
    );
    let (tx_job, rx_job) = unbounded::<String>();
    let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(MAX_IMAGE_WORKERS);
    for index in 0..MAX_IMAGE_WORKERS {
        let source = Arc::clone(&source);
        let rx_job = rx_job.clone();
        let tx = tx_msg.clone();
        match std::thread::Builder::new()
            .name(format!("image-fetch-{index}"))
            .spawn(move || fetch_worker(source, rx_job, tx))
        {
            Ok(worker) => workers.push(worker),
            Err(e) => error!("[images] failed to spawn worker {}: {}", index, e),
        }
    }
    drop(rx_job);

    for cmd in rx_cmd.iter() {
        match cmd {
            ImageCmd::Fetch { url } => {
                if workers.is_empty() {
                    let _ = tx_msg.send(ImageMessage::LoadFailed {
                        url,
                        error: "no image workers available".to_string(),
                    });
                } else if let Err(e) = tx_job.send(url) {
                    let _ = tx_msg.send(ImageMessage::LoadFailed {
                        url: e.into_inner(),
                        error: "image workers stopped".to_string(),
                    });
                }
            }
            ImageCmd::Shutdown => break,
        }
    }

    drop(tx_job);
    for worker in workers {
        let _ = worker.join();
    }
    info!("[images] thread exiting");
}

/// Fetch queued URLs until the job channel closes.
///
/// A panicking source is reported as a failed load so the image still
/// counts as complete. Under `panic = "abort"` (the release profile) the
/// process aborts instead.
fn fetch_worker(source: Arc<dyn ImageSource>, rx_job: Receiver<String>, tx: Sender<ImageMessage>) {
    for url in rx_job.iter() {
        let msg = match catch_unwind(AssertUnwindSafe(|| source.fetch(&url))) {
            Ok(Ok(bytes)) => ImageMessage::Loaded { url, bytes },
            Ok(Err(error)) => ImageMessage::LoadFailed { url, error },
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("[images] source panicked on '{}': {}", url, reason);
                ImageMessage::LoadFailed {
                    url,
                    error: format!("image source panicked: {reason}"),
                }
            }
        };
        if tx.send(msg).is_err() {
            break;
        }
    }
}

/// Drain results from the image thread.
///
/// Non-blocking; intended to run every tick on the main thread.
pub fn poll_image_messages(
    mut commands: Commands,
    bridge: Option<Res<ImageBridge>>,
    mut loader: Option<ResMut<ResourceLoader>>,
    mut store: Option<ResMut<ImageStore>>,
) {
    let Some(bridge) = bridge else {
        return;
    };
    for msg in bridge.rx_msg.try_iter() {
        let url = match msg {
            ImageMessage::Loaded { url, bytes } => {
                debug!("[images] loaded '{}' ({} bytes)", url, bytes.len());
                if let Some(store) = store.as_deref_mut() {
                    store.insert(url.clone(), bytes);
                }
                url
            }
            ImageMessage::LoadFailed { url, error } => {
                warn!("[images] failed to load '{}': {}", url, error);
                url
            }
        };
        let Some(loader) = loader.as_deref_mut() else {
            continue;
        };
        let completion = loader.loaded_resource(ResourceKind::Image, &url);
        emit_completion(&mut commands, completion);
        for next in loader.next_image_fetches() {
            bridge.fetch(next);
        }
    }
}
