//! Image discovery in stylesheets.
//!
//! A manifest may name stylesheets and CSS selectors instead of listing
//! images one by one. [`StylesheetScanner`] turns those names into image
//! URLs; [`CssDirScanner`] does so by scanning `.css` files on disk.

use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment regex"));
static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)[^\s()'";,]+\.(?:gif|jpe?g|png)\b"#).expect("valid image url regex")
});

/// Source of image URLs referenced from stylesheets.
pub trait StylesheetScanner: Send + Sync {
    /// Every image referenced by a rule of the stylesheet called `name`.
    /// Unknown stylesheets yield nothing.
    fn stylesheet_images(&self, name: &str) -> Vec<String>;

    /// Every image referenced by a rule whose selector text contains
    /// `selector` as a whole token, across all stylesheets.
    fn selector_images(&self, selector: &str) -> Vec<String>;
}

/// World resource holding the scanner used to expand manifests.
#[derive(Resource)]
pub struct StylesheetScannerHandle(pub Box<dyn StylesheetScanner>);

/// One `selector { body }` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub body: String,
}

/// Split CSS text into rules. Comments are dropped; the selector of a rule
/// nested in an at-rule is the innermost one.
pub fn parse_rules(css: &str) -> Vec<CssRule> {
    let css = COMMENT.replace_all(css, "");
    let mut rules = Vec::new();
    for chunk in css.split('}') {
        let Some(open) = chunk.rfind('{') else {
            continue;
        };
        let selector = chunk[..open].rsplit('{').next().unwrap_or("").trim();
        if selector.is_empty() {
            continue;
        }
        rules.push(CssRule {
            selector: selector.to_string(),
            body: chunk[open + 1..].to_string(),
        });
    }
    rules
}

/// Image URLs (`gif`, `jpg`, `jpeg`, `png`) found in a rule body, in order.
/// Bodies without a `url` reference yield nothing.
pub fn extract_image_urls(body: &str) -> Vec<String> {
    if !body.to_ascii_lowercase().contains("url") {
        return Vec::new();
    }
    IMAGE_URL
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Regex matching `selector` as a whole token: not directly preceded or
/// followed by an ASCII letter.
pub fn selector_pattern(selector: &str) -> Option<Regex> {
    let pattern = format!(
        "(^|[^a-zA-Z]){}([^a-zA-Z]|$)",
        regex::escape(selector.trim())
    );
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid selector '{}': {}", selector, e);
            None
        }
    }
}

/// Scans every `.css` file below a directory.
#[derive(Debug, Clone)]
pub struct CssDirScanner {
    root: PathBuf,
}

impl CssDirScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stylesheet files in file-name order, paired with their path relative
    /// to the root using `/` separators.
    fn stylesheets(&self) -> Vec<(String, PathBuf)> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
            })
            .map(|entry| {
                let rel = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or(entry.path())
                    .to_string_lossy()
                    .replace('\\', "/");
                (rel, entry.path().to_path_buf())
            })
            .collect()
    }

    fn read_rules(path: &Path) -> Vec<CssRule> {
        match std::fs::read_to_string(path) {
            Ok(css) => parse_rules(&css),
            Err(e) => {
                warn!("Failed to read stylesheet {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

impl StylesheetScanner for CssDirScanner {
    fn stylesheet_images(&self, name: &str) -> Vec<String> {
        let file_name = format!("{}.css", name.trim_end_matches(".css"));
        let nested = format!("/{}", file_name);
        let Some((rel, path)) = self
            .stylesheets()
            .into_iter()
            .find(|(rel, _)| *rel == file_name || rel.ends_with(&nested))
        else {
            debug!("No stylesheet named '{}' under {}", name, self.root.display());
            return Vec::new();
        };
        debug!("Scanning stylesheet {} for images", rel);
        Self::read_rules(&path)
            .iter()
            .flat_map(|rule| extract_image_urls(&rule.body))
            .collect()
    }

    fn selector_images(&self, selector: &str) -> Vec<String> {
        let Some(pattern) = selector_pattern(selector) else {
            return Vec::new();
        };
        let mut urls = Vec::new();
        for (_, path) in self.stylesheets() {
            for rule in Self::read_rules(&path) {
                if pattern.is_match(&rule.selector) {
                    urls.extend(extract_image_urls(&rule.body));
                }
            }
        }
        urls
    }
}
