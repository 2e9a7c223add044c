//! Local object URLs for blobs.
//!
//! Mirrors the browser object-URL registry: every call mints a fresh
//! URL for the blob, and a URL keeps its blob alive until revoked.

use std::collections::HashMap;

use tracing::debug;

use crate::Blob;

#[derive(Debug, Default)]
pub struct ObjectUrls {
    urls: HashMap<String, Blob>,
    next_id: u64,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new URL for the blob.
    ///
    /// Each call returns a distinct URL, even for the same blob.
    pub fn create(&mut self, blob: &Blob) -> String {
        let url = format!("blob:bunny/{:08x}", self.next_id);
        self.next_id += 1;
        self.urls.insert(url.clone(), blob.clone());
        debug!("object URL created: {} ({} bytes)", url, blob.size());
        url
    }

    /// Look up the blob behind a URL
    pub fn get(&self, url: &str) -> Option<&Blob> {
        self.urls.get(url)
    }

    /// Drop a URL. Returns false when the URL was unknown or already revoked.
    pub fn revoke(&mut self, url: &str) -> bool {
        self.urls.remove(url).is_some()
    }

    /// Number of live URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
