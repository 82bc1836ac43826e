//! Observers writing preload events to the [`DevLogger`].

use crate::events::preload::{PreloadDone, PreloadProgress, PreloadStarted};
use crate::resources::devlogger::DevLogger;
use crate::resources::resourceloader::ResourceLoader;
use bevy_ecs::prelude::*;

pub fn devlog_preload_started(
    _trigger: On<PreloadStarted>,
    mut devlog: ResMut<DevLogger>,
    loader: Option<Res<ResourceLoader>>,
) {
    let total = loader.map_or(0, |l| l.total());
    devlog.log(format!("preload started: {} resources", total));
}

pub fn devlog_preload_progress(trigger: On<PreloadProgress>, mut devlog: ResMut<DevLogger>) {
    devlog.log(format!("preload progress: {:.0}%", trigger.event().percent));
}

pub fn devlog_preload_done(_trigger: On<PreloadDone>, mut devlog: ResMut<DevLogger>) {
    devlog.log("preload done");
}

/// Register the dev-log observers on `world`.
pub fn observe_preload_with_devlog(world: &mut World) {
    world.init_resource::<DevLogger>();
    world.add_observer(devlog_preload_started);
    world.add_observer(devlog_preload_progress);
    world.add_observer(devlog_preload_done);
    world.flush();
}
