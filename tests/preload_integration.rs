//! End-to-end preload tests: real image and audio threads, in-memory
//! collaborators, and observers recording the emitted events.

use bevy_ecs::prelude::*;
use preloadkit::events::preload::{PreloadDone, PreloadProgress, PreloadStarted};
use preloadkit::resources::audio::{setup_audio, shutdown_audio};
use preloadkit::resources::audiomanager::{
    AudioBackend, NullAudioManager, StreamingAudioManager, create_audio_manager,
};
use preloadkit::resources::devlogger::{DevLogger, DevLoggerConfig};
use preloadkit::resources::fontprobe::FontProbeHandle;
use preloadkit::resources::imageloader::{ImageSource, setup_images, shutdown_images};
use preloadkit::resources::imagestore::ImageStore;
use preloadkit::resources::manifest::ResourceManifest;
use preloadkit::resources::preloadconfig::PreloadConfig;
use preloadkit::resources::resourceloader::{LoaderState, ResourceKind, ResourceLoader};
use preloadkit::resources::stylesheet::{CssDirScanner, StylesheetScannerHandle};
use preloadkit::systems::devlog::observe_preload_with_devlog;
use preloadkit::systems::preload::{
    add_resource_manifest, complete_resource, preload_schedule, run_until_done, setup_preloader,
    shutdown_preloader, start_preload,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(1);
const TIMEOUT: Option<Duration> = Some(Duration::from_secs(10));

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Started,
    Progress(f32),
    Done,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record_events(world: &mut World) -> Log {
    let seen: Log = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    world.add_observer(move |_trigger: On<PreloadStarted>| s.lock().unwrap().push(Seen::Started));
    let s = seen.clone();
    world.add_observer(move |trigger: On<PreloadProgress>| {
        s.lock().unwrap().push(Seen::Progress(trigger.event().percent))
    });
    let s = seen.clone();
    world.add_observer(move |_trigger: On<PreloadDone>| s.lock().unwrap().push(Seen::Done));
    world.flush();
    seen
}

fn memory_images() -> Arc<dyn ImageSource> {
    Arc::new(|url: &str| -> Result<Vec<u8>, String> {
        if url.starts_with("missing") {
            Err(format!("{} not found", url))
        } else {
            // Uneven delays so completion order differs from issue order.
            std::thread::sleep(Duration::from_millis((url.len() % 3) as u64 * 5));
            Ok(url.as_bytes().to_vec())
        }
    })
}

fn world_with_threads(parallel: bool) -> (World, Log) {
    world_with_image_source(parallel, memory_images())
}

fn world_with_image_source(parallel: bool, images: Arc<dyn ImageSource>) -> (World, Log) {
    let mut world = World::new();
    world.insert_resource(ResourceLoader::new(parallel));
    world.insert_resource(ImageStore::default());
    world.insert_resource(FontProbeHandle(Box::new(|family: &str| family != "Slow")));
    world.insert_resource(PreloadConfig {
        font_poll_interval: Duration::from_millis(5),
        font_timeout: Some(Duration::from_millis(50)),
        ..PreloadConfig::default()
    });
    setup_images(&mut world, images);
    setup_audio(&mut world, Box::new(NullAudioManager::new()));
    let seen = record_events(&mut world);
    (world, seen)
}

fn teardown(world: &mut World) {
    shutdown_images(world);
    shutdown_audio(world);
}

fn sample_manifest() -> ResourceManifest {
    ResourceManifest {
        images: vec![
            "img/a.png".to_string(),
            "img/b.png".to_string(),
            "img/a.png".to_string(),
            "missing.png".to_string(),
        ],
        fonts: vec!["Foo".to_string(), "Slow".to_string()],
        sounds: vec!["click".to_string(), "music".to_string()],
        ..ResourceManifest::default()
    }
}

/// Events must be Started, then non-decreasing progress ending at 100,
/// then exactly one Done.
fn assert_well_ordered(events: &[Seen], total: usize) {
    assert_eq!(events.first(), Some(&Seen::Started));
    assert_eq!(events.last(), Some(&Seen::Done));
    assert_eq!(events.iter().filter(|e| **e == Seen::Done).count(), 1);
    assert_eq!(
        events.iter().filter(|e| **e == Seen::Started).count(),
        1
    );

    let progress: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            Seen::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), total);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100.0));
    assert_eq!(events[events.len() - 2], Seen::Progress(100.0));
}

fn run_full_pipeline(parallel: bool) {
    let (mut world, seen) = world_with_threads(parallel);
    add_resource_manifest(&mut world, &sample_manifest()).unwrap();
    assert_eq!(world.resource::<ResourceLoader>().total(), 7);

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();

    let events = seen.lock().unwrap().clone();
    assert_well_ordered(&events, 7);

    let loader = world.resource::<ResourceLoader>();
    assert_eq!(loader.state(), LoaderState::Done);
    assert_eq!(loader.unloaded(), 0);

    let store = world.resource::<ImageStore>();
    assert_eq!(store.get("img/a.png"), Some(&b"img/a.png"[..]));
    assert!(store.contains("img/b.png"));
    assert!(!store.contains("missing.png"));

    teardown(&mut world);
}

#[test]
fn serial_preload_completes_in_order() {
    run_full_pipeline(false);
}

#[test]
fn parallel_preload_completes_in_order() {
    run_full_pipeline(true);
}

#[test]
fn panicking_image_source_counts_as_failed_load() {
    let images: Arc<dyn ImageSource> = Arc::new(|url: &str| -> Result<Vec<u8>, String> {
        if url == "bad.png" {
            panic!("corrupt header in {}", url);
        }
        Ok(url.as_bytes().to_vec())
    });
    let (mut world, seen) = world_with_image_source(false, images);
    {
        let mut loader = world.resource_mut::<ResourceLoader>();
        loader.add_image("bad.png").unwrap();
        loader.add_image("good.png").unwrap();
    }

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();

    assert_well_ordered(&seen.lock().unwrap(), 2);
    assert_eq!(world.resource::<ResourceLoader>().unloaded(), 0);
    let store = world.resource::<ImageStore>();
    assert!(!store.contains("bad.png"));
    assert!(store.contains("good.png"));

    teardown(&mut world);
}

/// Image source that records how many fetches overlap.
fn counting_images(live: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> Arc<dyn ImageSource> {
    Arc::new(move |url: &str| -> Result<Vec<u8>, String> {
        let now = live.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(3));
        live.fetch_sub(1, Ordering::SeqCst);
        Ok(url.as_bytes().to_vec())
    })
}

fn peak_concurrent_fetches(parallel: bool) -> usize {
    let live = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (mut world, seen) =
        world_with_image_source(parallel, counting_images(live, Arc::clone(&peak)));
    {
        let mut loader = world.resource_mut::<ResourceLoader>();
        for i in 0..8 {
            loader.add_image(&format!("img/{i}.png")).unwrap();
        }
    }

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();
    assert_well_ordered(&seen.lock().unwrap(), 8);
    assert_eq!(world.resource::<ImageStore>().len(), 8);

    teardown(&mut world);
    peak.load(Ordering::SeqCst)
}

#[test]
fn serial_images_never_overlap_on_the_image_thread() {
    assert_eq!(peak_concurrent_fetches(false), 1);
}

#[test]
fn parallel_images_overlap_on_the_image_thread() {
    assert!(peak_concurrent_fetches(true) > 1);
}

#[test]
fn empty_preload_emits_started_then_done() {
    let (mut world, seen) = world_with_threads(false);
    start_preload(&mut world).unwrap();
    assert_eq!(*seen.lock().unwrap(), [Seen::Started, Seen::Done]);
    assert!(world.resource::<ResourceLoader>().is_done());
    teardown(&mut world);
}

#[test]
fn completions_after_done_are_ignored() {
    let (mut world, seen) = world_with_threads(true);
    {
        let mut loader = world.resource_mut::<ResourceLoader>();
        loader.add_sound("click").unwrap();
    }
    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();
    let before = seen.lock().unwrap().len();

    complete_resource(&mut world, ResourceKind::Sound, "click");
    complete_resource(&mut world, ResourceKind::Image, "late.png");
    schedule.run(&mut world);

    assert_eq!(seen.lock().unwrap().len(), before);
    assert_eq!(
        *seen.lock().unwrap(),
        [Seen::Started, Seen::Progress(100.0), Seen::Done]
    );
    teardown(&mut world);
}

#[test]
fn adding_after_start_is_rejected() {
    let (mut world, _seen) = world_with_threads(false);
    start_preload(&mut world).unwrap();
    assert!(add_resource_manifest(&mut world, &sample_manifest()).is_err());
    assert!(start_preload(&mut world).is_err());
    teardown(&mut world);
}

#[test]
fn stylesheet_images_are_preloaded() {
    let css = tempfile::tempdir().unwrap();
    std::fs::write(
        css.path().join("main.css"),
        "body { background: url(img/bg.png); }\n.logo { background: url('img/logo.gif'); }",
    )
    .unwrap();

    let (mut world, seen) = world_with_threads(true);
    world.insert_resource(StylesheetScannerHandle(Box::new(CssDirScanner::new(
        css.path(),
    ))));
    let manifest = ResourceManifest {
        stylesheets: vec!["main".to_string()],
        selectors: vec![".logo".to_string()],
        images: vec!["img/extra.png".to_string()],
        ..ResourceManifest::default()
    };
    add_resource_manifest(&mut world, &manifest).unwrap();
    assert_eq!(
        world.resource::<ResourceLoader>().images(),
        ["img/bg.png", "img/logo.gif", "img/extra.png"]
    );

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();
    assert_well_ordered(&seen.lock().unwrap(), 3);
    assert_eq!(world.resource::<ImageStore>().len(), 3);
    teardown(&mut world);
}

#[test]
fn streaming_backend_preloads_sound_files() {
    let sounds = tempfile::tempdir().unwrap();
    std::fs::write(sounds.path().join("ding.mp3"), b"ID3").unwrap();
    let sound_path = format!("{}/", sounds.path().display());

    let mut world = World::new();
    let mut loader = ResourceLoader::new(false);
    loader.add_sound("ding").unwrap();
    loader.add_sound("absent").unwrap();
    world.insert_resource(loader);
    setup_audio(
        &mut world,
        Box::new(StreamingAudioManager::new(Some(&sound_path))),
    );
    let seen = record_events(&mut world);

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();
    assert_well_ordered(&seen.lock().unwrap(), 2);
    shutdown_audio(&mut world);
}

#[test]
fn setup_preloader_runs_against_directories() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("img")).unwrap();
    std::fs::create_dir_all(root.path().join("fonts")).unwrap();
    std::fs::create_dir_all(root.path().join("css")).unwrap();
    std::fs::write(root.path().join("img/a.png"), b"PNG").unwrap();
    std::fs::write(root.path().join("fonts/OpenSans.ttf"), b"TTF").unwrap();
    std::fs::write(
        root.path().join("css/site.css"),
        ".hero { background: url(img/a.png); }",
    )
    .unwrap();

    let config = PreloadConfig {
        image_root: root.path().to_path_buf(),
        stylesheet_dir: root.path().join("css"),
        font_dirs: vec![root.path().join("fonts")],
        font_poll_interval: Duration::from_millis(5),
        audio_backend: AudioBackend::Null,
        devlog: DevLoggerConfig {
            log_to_console: false,
            log_in_memory: true,
            buffer_size: 10,
        },
        ..PreloadConfig::default()
    };

    let mut world = World::new();
    setup_preloader(&mut world, &config);
    observe_preload_with_devlog(&mut world);
    let seen = record_events(&mut world);

    let manifest = ResourceManifest {
        stylesheets: vec!["site".to_string()],
        images: vec!["img/a.png".to_string()],
        fonts: vec!["Open Sans".to_string()],
        sounds: vec!["click".to_string()],
        ..ResourceManifest::default()
    };
    add_resource_manifest(&mut world, &manifest).unwrap();
    assert_eq!(world.resource::<ResourceLoader>().total(), 3);

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();
    shutdown_preloader(&mut world);

    assert_well_ordered(&seen.lock().unwrap(), 3);
    assert_eq!(world.resource::<ImageStore>().get("img/a.png"), Some(&b"PNG"[..]));

    let devlog = world.resource::<DevLogger>();
    let history: Vec<&str> = devlog.recent_history().collect();
    assert_eq!(history.first(), Some(&"preload started: 3 resources"));
    assert_eq!(history.last(), Some(&"preload done"));
    assert!(history.contains(&"preload progress: 100%"));
}

#[test]
fn audio_backend_from_config_name() {
    let backend: AudioBackend = "desktop".parse().unwrap();
    let mut world = World::new();
    let mut loader = ResourceLoader::new(false);
    loader.add_sound("nothing-here").unwrap();
    world.insert_resource(loader);
    setup_audio(&mut world, create_audio_manager(backend, Some("/no/such/dir/"), None));
    let seen = record_events(&mut world);

    start_preload(&mut world).unwrap();
    let mut schedule = preload_schedule();
    run_until_done(&mut world, &mut schedule, TICK, TIMEOUT).unwrap();
    assert_well_ordered(&seen.lock().unwrap(), 1);
    shutdown_audio(&mut world);
}
