//! Font availability checks.
//!
//! Fonts have no load callback; the preloader polls a [`FontProbe`] for each
//! font family until it reports the family available or the watch times out
//! (see [`crate::systems::fontwatch`]).

use bevy_ecs::prelude::Resource;
use log::debug;
use std::path::PathBuf;
use walkdir::WalkDir;

const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "woff", "woff2"];

/// Answers whether a font family is available.
pub trait FontProbe: Send + Sync {
    fn is_loaded(&self, family: &str) -> bool;
}

impl<F> FontProbe for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_loaded(&self, family: &str) -> bool {
        self(family)
    }
}

/// World resource holding the probe polled by the font watch system.
#[derive(Resource)]
pub struct FontProbeHandle(pub Box<dyn FontProbe>);

/// Looks for a font file named after the family in a set of directories.
///
/// `"Open Sans"` matches `OpenSans.ttf`, `open-sans.woff2` or
/// `open_sans.otf`: names are compared lowercased with spaces, dashes, and
/// underscores removed.
#[derive(Debug, Clone, Default)]
pub struct FontDirProbe {
    dirs: Vec<PathBuf>,
}

impl FontDirProbe {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

fn normalize_family(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '"' | '\''))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FontProbe for FontDirProbe {
    fn is_loaded(&self, family: &str) -> bool {
        let wanted = normalize_family(family);
        if wanted.is_empty() {
            return false;
        }
        let found = self.dirs.iter().any(|dir| {
            WalkDir::new(dir)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .any(|entry| {
                    let path = entry.path();
                    let is_font = path.extension().is_some_and(|ext| {
                        FONT_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    });
                    is_font
                        && path
                            .file_stem()
                            .is_some_and(|stem| normalize_family(&stem.to_string_lossy()) == wanted)
                })
        });
        debug!("Font probe '{}': {}", family, found);
        found
    }
}
