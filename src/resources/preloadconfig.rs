//! Preloader configuration resource.
//!
//! Settings are read from an INI file; anything missing keeps a safe
//! default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [loader]
//! parallel_images = false
//! tick_ms = 16
//! font_poll_interval_ms = 100
//! font_timeout_ms = 10000
//! load_timeout_ms = 0
//!
//! [assets]
//! image_root = ./static
//! stylesheet_dir = ./static/css
//! font_dirs = ./static/fonts, /usr/share/fonts
//!
//! [audio]
//! backend = null
//! sound_path = static/sounds/
//! extension = mp3
//! volume = 1.0
//! muted = false
//!
//! [devlog]
//! log_to_console = true
//! log_in_memory = true
//! buffer_size = 50
//! ```
//!
//! A timeout of `0` disables it.

use crate::error::PreloadError;
use crate::resources::audiomanager::AudioBackend;
use crate::resources::devlogger::{DEFAULT_BUFFER_SIZE, DevLoggerConfig};
use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_FONT_POLL_INTERVAL_MS: u64 = 100;
const DEFAULT_FONT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_IMAGE_ROOT: &str = "./static";
const DEFAULT_STYLESHEET_DIR: &str = "./static/css";
const DEFAULT_FONT_DIR: &str = "./static/fonts";
const DEFAULT_CONFIG_PATH: &str = "./preload.ini";

#[derive(Resource, Debug, Clone)]
pub struct PreloadConfig {
    /// Fetch every image at once instead of one after another.
    pub parallel_images: bool,
    /// Sleep between ticks of the blocking runner.
    pub tick: Duration,
    /// How often each pending font is probed.
    pub font_poll_interval: Duration,
    /// Give up on a font after this long and count it as loaded.
    pub font_timeout: Option<Duration>,
    /// Whole-run timeout of the blocking runner.
    pub load_timeout: Option<Duration>,
    pub image_root: PathBuf,
    pub stylesheet_dir: PathBuf,
    pub font_dirs: Vec<PathBuf>,
    pub audio_backend: AudioBackend,
    /// Backend default when `None`.
    pub sound_path: Option<String>,
    /// Backend default when `None`.
    pub sound_extension: Option<String>,
    /// Global volume, `0.0` to `1.0`.
    pub volume: f32,
    pub muted: bool,
    pub devlog: DevLoggerConfig,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn as_millis(duration: Option<Duration>) -> u64 {
    duration.map_or(0, |d| d.as_millis() as u64)
}

impl PreloadConfig {
    /// Create a configuration with safe default values.
    pub fn new() -> Self {
        Self {
            parallel_images: false,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            font_poll_interval: Duration::from_millis(DEFAULT_FONT_POLL_INTERVAL_MS),
            font_timeout: millis(DEFAULT_FONT_TIMEOUT_MS),
            load_timeout: None,
            image_root: PathBuf::from(DEFAULT_IMAGE_ROOT),
            stylesheet_dir: PathBuf::from(DEFAULT_STYLESHEET_DIR),
            font_dirs: vec![PathBuf::from(DEFAULT_FONT_DIR)],
            audio_backend: AudioBackend::default(),
            sound_path: None,
            sound_extension: None,
            volume: 1.0,
            muted: false,
            devlog: DevLoggerConfig::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Returns an error if the
    /// file cannot be read or names an unknown audio backend, in which case
    /// nothing is changed.
    pub fn load_from_file(&mut self) -> Result<(), PreloadError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(|e| {
            PreloadError::Config(format!(
                "failed to load {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let audio_backend = config
            .get("audio", "backend")
            .map(|b| b.parse::<AudioBackend>())
            .transpose()
            .map_err(PreloadError::Config)?;
        let mut next = self.clone();

        // [loader] section
        if let Some(parallel) = config.getbool("loader", "parallel_images").ok().flatten() {
            next.parallel_images = parallel;
        }
        if let Some(ms) = config.getuint("loader", "tick_ms").ok().flatten() {
            next.tick = Duration::from_millis(ms);
        }
        if let Some(ms) = config
            .getuint("loader", "font_poll_interval_ms")
            .ok()
            .flatten()
        {
            next.font_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = config.getuint("loader", "font_timeout_ms").ok().flatten() {
            next.font_timeout = millis(ms);
        }
        if let Some(ms) = config.getuint("loader", "load_timeout_ms").ok().flatten() {
            next.load_timeout = millis(ms);
        }

        // [assets] section
        if let Some(root) = config.get("assets", "image_root") {
            next.image_root = PathBuf::from(root);
        }
        if let Some(dir) = config.get("assets", "stylesheet_dir") {
            next.stylesheet_dir = PathBuf::from(dir);
        }
        if let Some(dirs) = config.get("assets", "font_dirs") {
            next.font_dirs = dirs
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        // [audio] section
        if let Some(backend) = audio_backend {
            next.audio_backend = backend;
        }
        if let Some(path) = config.get("audio", "sound_path") {
            next.sound_path = Some(path);
        }
        if let Some(ext) = config.get("audio", "extension") {
            next.sound_extension = Some(ext);
        }
        if let Some(volume) = config.getfloat("audio", "volume").ok().flatten() {
            next.volume = (volume as f32).clamp(0.0, 1.0);
        }
        if let Some(muted) = config.getbool("audio", "muted").ok().flatten() {
            next.muted = muted;
        }

        // [devlog] section
        if let Some(on) = config.getbool("devlog", "log_to_console").ok().flatten() {
            next.devlog.log_to_console = on;
        }
        if let Some(on) = config.getbool("devlog", "log_in_memory").ok().flatten() {
            next.devlog.log_in_memory = on;
        }
        if let Some(size) = config.getuint("devlog", "buffer_size").ok().flatten() {
            next.devlog.buffer_size = size as usize;
        }

        info!(
            "Loaded config: parallel_images={}, font_poll={:?}, font_timeout={:?}, audio={}, image_root={}",
            next.parallel_images,
            next.font_poll_interval,
            next.font_timeout,
            next.audio_backend,
            next.image_root.display()
        );

        *self = next;
        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), PreloadError> {
        let mut config = Ini::new();

        // [loader] section
        config.set("loader", "parallel_images", Some(self.parallel_images.to_string()));
        config.set("loader", "tick_ms", Some(self.tick.as_millis().to_string()));
        config.set(
            "loader",
            "font_poll_interval_ms",
            Some(self.font_poll_interval.as_millis().to_string()),
        );
        config.set(
            "loader",
            "font_timeout_ms",
            Some(as_millis(self.font_timeout).to_string()),
        );
        config.set(
            "loader",
            "load_timeout_ms",
            Some(as_millis(self.load_timeout).to_string()),
        );

        // [assets] section
        config.set("assets", "image_root", Some(self.image_root.display().to_string()));
        config.set(
            "assets",
            "stylesheet_dir",
            Some(self.stylesheet_dir.display().to_string()),
        );
        let font_dirs: Vec<String> = self
            .font_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        config.set("assets", "font_dirs", Some(font_dirs.join(", ")));

        // [audio] section
        config.set("audio", "backend", Some(self.audio_backend.to_string()));
        if let Some(path) = &self.sound_path {
            config.set("audio", "sound_path", Some(path.clone()));
        }
        if let Some(ext) = &self.sound_extension {
            config.set("audio", "extension", Some(ext.clone()));
        }
        config.set("audio", "volume", Some(self.volume.to_string()));
        config.set("audio", "muted", Some(self.muted.to_string()));

        // [devlog] section
        config.set(
            "devlog",
            "log_to_console",
            Some(self.devlog.log_to_console.to_string()),
        );
        config.set(
            "devlog",
            "log_in_memory",
            Some(self.devlog.log_in_memory.to_string()),
        );
        config.set(
            "devlog",
            "buffer_size",
            Some(self.devlog.buffer_size.to_string()),
        );

        config.write(&self.config_path).map_err(|e| {
            PreloadError::Config(format!(
                "failed to save {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreloadConfig::new();
        assert!(!config.parallel_images);
        assert_eq!(config.font_poll_interval, Duration::from_millis(100));
        assert_eq!(config.font_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.load_timeout, None);
        assert_eq!(config.audio_backend, AudioBackend::Null);
        assert_eq!(config.devlog.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preload.ini");
        std::fs::write(
            &path,
            "[loader]\nparallel_images = true\nfont_timeout_ms = 0\n\n[assets]\nfont_dirs = a, b ,\n\n[audio]\nbackend = desktop\nvolume = 0.5\n",
        )
        .unwrap();

        let mut config = PreloadConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert!(config.parallel_images);
        assert_eq!(config.font_timeout, None);
        assert_eq!(config.font_dirs, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(config.audio_backend, AudioBackend::Streaming);
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.tick, Duration::from_millis(DEFAULT_TICK_MS));
        assert_eq!(config.image_root, PathBuf::from(DEFAULT_IMAGE_ROOT));
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preload.ini");
        std::fs::write(&path, "[audio]\nbackend = flash\n").unwrap();
        let mut config = PreloadConfig::with_path(&path);
        assert!(matches!(
            config.load_from_file(),
            Err(PreloadError::Config(_))
        ));
    }

    #[test]
    fn test_failed_load_leaves_config_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preload.ini");
        std::fs::write(
            &path,
            "[loader]\nparallel_images = true\nfont_timeout_ms = 1\n\n[assets]\nimage_root = elsewhere\n\n[audio]\nbackend = flash\n",
        )
        .unwrap();
        let mut config = PreloadConfig::with_path(&path);
        assert!(config.load_from_file().is_err());
        assert!(!config.parallel_images);
        assert_eq!(config.font_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.image_root, PathBuf::from(DEFAULT_IMAGE_ROOT));
        assert_eq!(config.audio_backend, AudioBackend::Null);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let mut config = PreloadConfig::with_path("/no/such/preload.ini");
        assert!(matches!(
            config.load_from_file(),
            Err(PreloadError::Config(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PreloadConfig::with_path(dir.path().join("out.ini"));
        config.parallel_images = true;
        config.load_timeout = Some(Duration::from_secs(3));
        config.audio_backend = AudioBackend::Native;
        config.sound_extension = Some("wav".to_string());
        config.devlog.buffer_size = 7;
        config.save_to_file().unwrap();

        let mut loaded = PreloadConfig::with_path(dir.path().join("out.ini"));
        loaded.load_from_file().unwrap();
        assert!(loaded.parallel_images);
        assert_eq!(loaded.load_timeout, Some(Duration::from_secs(3)));
        assert_eq!(loaded.audio_backend, AudioBackend::Native);
        assert_eq!(loaded.sound_extension.as_deref(), Some("wav"));
        assert_eq!(loaded.devlog.buffer_size, 7);
    }
}
