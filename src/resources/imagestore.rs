use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

/// Bytes of every image fetched during preloading, keyed by URL.
///
/// Failed fetches leave no entry.
#[derive(Resource, Debug, Default)]
pub struct ImageStore {
    pub map: FxHashMap<String, Vec<u8>>,
}

impl ImageStore {
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.map.insert(url.into(), bytes);
    }

    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.map.get(url).map(Vec::as_slice)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.map.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total number of cached bytes.
    pub fn total_bytes(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }
}
