//! Font polling.
//!
//! Each pending font family is an entity with a
//! [`FontWatch`](crate::components::fontwatch::FontWatch). Every tick the
//! watches advance by [`WorldTime::delta`]; a watch that is due asks the
//! [`FontProbeHandle`] whether its family is available. A watch completes
//! when the probe says yes or when its timeout elapses, whether or not a
//! probe is due that tick, and is despawned.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::fontwatch::FontWatch;
use crate::resources::fontprobe::FontProbeHandle;
use crate::resources::resourceloader::{ResourceKind, ResourceLoader};
use crate::resources::worldtime::WorldTime;
use crate::systems::preload::emit_completion;

pub fn font_watch_system(
    mut commands: Commands,
    world_time: Option<Res<WorldTime>>,
    probe: Option<Res<FontProbeHandle>>,
    mut loader: Option<ResMut<ResourceLoader>>,
    mut query: Query<(Entity, &mut FontWatch)>,
) {
    let dt = world_time.map_or(0.0, |t| t.delta);
    for (entity, mut watch) in query.iter_mut() {
        watch.advance(dt);
        let loaded = if watch.due() {
            watch.reset_check();
            match probe.as_deref() {
                Some(probe) => probe.0.is_loaded(&watch.family),
                None => {
                    debug!("No font probe; assuming '{}' is available", watch.family);
                    true
                }
            }
        } else {
            false
        };
        if !loaded {
            if !watch.timed_out() {
                continue;
            }
            warn!(
                "Font '{}' not available after {:.1}s ({} checks); counting it as loaded",
                watch.family, watch.elapsed, watch.attempts
            );
        }

        commands.entity(entity).try_despawn();
        if let Some(loader) = loader.as_deref_mut() {
            let completion = loader.loaded_resource(ResourceKind::Font, &watch.family);
            emit_completion(&mut commands, completion);
        }
    }
}
