//! JSON description of the resources to preload.
//!
//! ```json
//! {
//!   "stylesheets": ["main"],
//!   "selectors": [".button", "#logo"],
//!   "images": ["img/a.png", "img/b.png"],
//!   "fonts": ["Open Sans"],
//!   "sounds": ["click"]
//! }
//! ```
//!
//! Every key is optional.

use crate::error::PreloadError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceManifest {
    /// Stylesheet names; every image referenced by a `url(...)` in them is
    /// preloaded.
    pub stylesheets: Vec<String>,
    /// CSS selectors; images referenced by rules naming them are preloaded.
    pub selectors: Vec<String>,
    pub images: Vec<String>,
    pub fonts: Vec<String>,
    pub sounds: Vec<String>,
}

impl ResourceManifest {
    pub fn from_json_str(json: &str) -> Result<Self, PreloadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreloadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PreloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.stylesheets.is_empty()
            && self.selectors.is_empty()
            && self.images.is_empty()
            && self.fonts.is_empty()
            && self.sounds.is_empty()
    }
}
