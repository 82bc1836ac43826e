//! Commands and messages exchanged with the background image thread.

/// Commands sent *to* the image thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCmd {
    /// Start fetching the image. Each fetch runs on its own worker so
    /// several fetches can be in flight at once.
    Fetch { url: String },
    Shutdown,
}

/// Messages sent *back* from the image thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageMessage {
    Loaded { url: String, bytes: Vec<u8> },
    LoadFailed { url: String, error: String },
}

impl ImageMessage {
    pub fn url(&self) -> &str {
        match self {
            ImageMessage::Loaded { url, .. } | ImageMessage::LoadFailed { url, .. } => url,
        }
    }
}
