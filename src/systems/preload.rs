//! Preload driver.
//!
//! Wires the [`ResourceLoader`] to the background threads and turns every
//! completion into preload events.
//!
//! # Flow
//!
//! 1. [`setup_preloader`] inserts the loader, collaborators, and bridges.
//! 2. Resources are registered with [`add_resource_manifest`] or directly
//!    on the loader.
//! 3. [`start_preload`] triggers [`PreloadStarted`], spawns a
//!    [`FontWatch`] per font, and issues image fetches and sound preloads.
//! 4. The systems in [`preload_schedule`] run every tick, each completion
//!    triggering [`PreloadProgress`] and finally [`PreloadDone`].
//!    [`run_until_done`] drives the schedule for blocking callers.
//! 5. [`shutdown_preloader`] stops the threads.
//!
//! Without an [`ImageBridge`] or [`AudioBridge`] in the world, images and
//! sounds are counted as loaded as soon as they are issued.

use crate::components::fontwatch::FontWatch;
use crate::error::PreloadError;
use crate::events::audio::AudioCmd;
use crate::events::preload::{PreloadDone, PreloadProgress, PreloadStarted};
use crate::resources::audio::{AudioBridge, setup_audio, shutdown_audio};
use crate::resources::audiomanager::create_audio_manager;
use crate::resources::devlogger::DevLogger;
use crate::resources::fontprobe::{FontDirProbe, FontProbeHandle};
use crate::resources::imageloader::{FsImageSource, ImageBridge, setup_images, shutdown_images};
use crate::resources::imagestore::ImageStore;
use crate::resources::manifest::ResourceManifest;
use crate::resources::preloadconfig::PreloadConfig;
use crate::resources::resourceloader::{Completion, LoaderState, ResourceKind, ResourceLoader};
use crate::resources::stylesheet::{CssDirScanner, StylesheetScanner, StylesheetScannerHandle};
use crate::resources::worldtime::WorldTime;
use crate::systems::audio::{issue_sound_preloads, poll_audio_messages};
use crate::systems::fontwatch::font_watch_system;
use crate::systems::images::poll_image_messages;
use crate::systems::time::update_world_time;
use bevy_ecs::prelude::*;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Insert everything a preload needs, built from `config`.
///
/// Spawns the image and audio threads. Any loader already in the world is
/// replaced by an empty one.
pub fn setup_preloader(world: &mut World, config: &PreloadConfig) {
    world.init_resource::<WorldTime>();
    world.insert_resource(config.clone());
    world.insert_resource(ResourceLoader::new(config.parallel_images));
    world.insert_resource(ImageStore::default());
    world.insert_resource(FontProbeHandle(Box::new(FontDirProbe::new(
        config.font_dirs.clone(),
    ))));
    world.insert_resource(StylesheetScannerHandle(Box::new(CssDirScanner::new(
        config.stylesheet_dir.clone(),
    ))));
    if !world.contains_resource::<DevLogger>() {
        world.insert_resource(DevLogger::new(config.devlog.clone()));
    }

    setup_images(world, Arc::new(FsImageSource::new(config.image_root.clone())));

    let manager = create_audio_manager(
        config.audio_backend,
        config.sound_path.as_deref(),
        config.sound_extension.as_deref(),
    );
    setup_audio(world, manager);
    if let Some(bridge) = world.get_resource::<AudioBridge>() {
        bridge.send(AudioCmd::SetVolume { vol: config.volume });
        if config.muted {
            bridge.send(AudioCmd::SetMute { muted: true });
        }
    }

    info!(
        "Preloader ready (images {}, audio {})",
        if config.parallel_images {
            "in parallel"
        } else {
            "one at a time"
        },
        config.audio_backend
    );
}

/// Stop the image and audio threads.
pub fn shutdown_preloader(world: &mut World) {
    shutdown_images(world);
    shutdown_audio(world);
}

fn missing_loader() -> PreloadError {
    PreloadError::invalid_state("no ResourceLoader in the world")
}

/// Register every resource named in `manifest` with the world's loader,
/// expanding stylesheets through the world's scanner if there is one.
pub fn add_resource_manifest(
    world: &mut World,
    manifest: &ResourceManifest,
) -> Result<(), PreloadError> {
    if !world.contains_resource::<ResourceLoader>() {
        return Err(missing_loader());
    }
    world.resource_scope(|world, mut loader: Mut<ResourceLoader>| {
        let scanner: Option<&dyn StylesheetScanner> = world
            .get_resource::<StylesheetScannerHandle>()
            .map(|handle| handle.0.as_ref());
        loader.add_resource_manifest(manifest, scanner)
    })
}

/// Turn a completion into events, from inside a system.
pub fn emit_completion(commands: &mut Commands, completion: Completion) {
    match completion {
        Completion::Progress(percent) => commands.trigger(PreloadProgress { percent }),
        Completion::Finished { emit_progress } => {
            if emit_progress {
                commands.trigger(PreloadProgress { percent: 100.0 });
            }
            info!("Preload done");
            commands.trigger(PreloadDone);
        }
        Completion::Ignored => {}
    }
}

/// Turn a completion into events, with direct world access.
pub fn emit_completion_world(world: &mut World, completion: Completion) {
    match completion {
        Completion::Progress(percent) => world.trigger(PreloadProgress { percent }),
        Completion::Finished { emit_progress } => {
            if emit_progress {
                world.trigger(PreloadProgress { percent: 100.0 });
            }
            info!("Preload done");
            world.trigger(PreloadDone);
        }
        Completion::Ignored => {}
    }
}

/// Record a completion on the world's loader and emit its events.
pub fn complete_resource(world: &mut World, kind: ResourceKind, name: &str) {
    let completion = match world.get_resource_mut::<ResourceLoader>() {
        Some(mut loader) => loader.loaded_resource(kind, name),
        None => return,
    };
    emit_completion_world(world, completion);
}

fn font_watch_timing(world: &World) -> (f32, Option<f32>) {
    let config = world
        .get_resource::<PreloadConfig>()
        .cloned()
        .unwrap_or_default();
    (
        config.font_poll_interval.as_secs_f32(),
        config.font_timeout.map(|t| t.as_secs_f32()),
    )
}

/// Start loading everything registered with the world's loader.
///
/// Fails with [`PreloadError::InvalidState`] if there is no loader or it
/// already started. An empty loader triggers [`PreloadStarted`] then
/// [`PreloadDone`] right away.
pub fn start_preload(world: &mut World) -> Result<(), PreloadError> {
    let (fonts, total) = {
        let mut loader = world
            .get_resource_mut::<ResourceLoader>()
            .ok_or_else(missing_loader)?;
        loader.begin()?;
        (loader.fonts().to_vec(), loader.total())
    };
    info!("Starting preload of {} resources", total);
    world.trigger(PreloadStarted);

    let (interval, timeout) = font_watch_timing(world);
    for family in fonts {
        world.spawn(FontWatch::new(family, interval, timeout));
    }

    issue_images(world);
    issue_sounds(world);

    let completion = world.resource_mut::<ResourceLoader>().maybe_finish_loading();
    emit_completion_world(world, completion);
    Ok(())
}

fn issue_images(world: &mut World) {
    let has_bridge = world.contains_resource::<ImageBridge>();
    loop {
        let fetches = world.resource_mut::<ResourceLoader>().next_image_fetches();
        if fetches.is_empty() {
            return;
        }
        if has_bridge {
            let bridge = world.resource::<ImageBridge>();
            for url in fetches {
                bridge.fetch(url);
            }
            return;
        }
        warn!("No image thread; counting {} image(s) as loaded", fetches.len());
        for url in fetches {
            complete_resource(world, ResourceKind::Image, &url);
        }
    }
}

fn issue_sounds(world: &mut World) {
    if world.contains_resource::<AudioBridge>() {
        world.resource_scope(|world, bridge: Mut<AudioBridge>| {
            // Before Ready the preloads are issued by poll_audio_messages.
            if bridge.ready {
                issue_sound_preloads(&mut world.resource_mut::<ResourceLoader>(), &bridge);
            }
        });
        return;
    }
    let sounds = world.resource_mut::<ResourceLoader>().take_sounds_to_preload();
    if !sounds.is_empty() {
        warn!("No audio thread; counting {} sound(s) as loaded", sounds.len());
    }
    for id in sounds {
        complete_resource(world, ResourceKind::Sound, &id);
    }
}

/// Systems advancing a started preload, in tick order.
pub fn preload_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            poll_audio_messages,
            poll_image_messages,
            font_watch_system,
        )
            .chain(),
    );
    schedule
}

/// Tick `schedule` until the loader reports done.
///
/// Sleeps `tick` between iterations and feeds the real elapsed time to
/// [`WorldTime`]. Fails with [`PreloadError::Timeout`] once `timeout`
/// elapses, and with [`PreloadError::InvalidState`] if the preload was
/// never started.
pub fn run_until_done(
    world: &mut World,
    schedule: &mut Schedule,
    tick: Duration,
    timeout: Option<Duration>,
) -> Result<(), PreloadError> {
    let start = Instant::now();
    let mut last = start;
    loop {
        let state = world
            .get_resource::<ResourceLoader>()
            .map(|loader| (loader.state(), loader.is_done()))
            .ok_or_else(missing_loader)?;
        match state {
            (_, true) => return Ok(()),
            (LoaderState::Idle, _) => {
                return Err(PreloadError::invalid_state("preload was never started"));
            }
            _ => {}
        }
        if let Some(limit) = timeout {
            if start.elapsed() >= limit {
                return Err(PreloadError::Timeout(limit));
            }
        }

        let now = Instant::now();
        update_world_time(world, (now - last).as_secs_f32());
        last = now;
        schedule.run(world);
        std::thread::sleep(tick);
    }
}
