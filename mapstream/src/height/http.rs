//! HTTP-backed elevation loader.
//!
//! Fetches raw elevation tiles from a `{z}/{x}/{y}` URL template. Concurrent
//! claims of the same key share one request and one payload; the payload is
//! dropped as soon as its last claim is released.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::loader::{ElevationError, ElevationLoader, ElevationPayload};
use crate::coord::HeightTileKey;
use crate::provider::AsyncHttpClient;

type PayloadResult = Result<Arc<ElevationPayload>, ElevationError>;
type SharedFetch = Shared<BoxFuture<'static, PayloadResult>>;

struct Entry {
    generation: u64,
    claims: usize,
    fetch: SharedFetch,
}

#[derive(Default)]
struct EntryTable {
    entries: HashMap<HeightTileKey, Entry>,
    next_generation: u64,
}

/// Elevation loader fetching payloads over HTTP.
pub struct HttpElevationLoader<C: AsyncHttpClient + 'static> {
    http: Arc<C>,
    url_template: String,
    table: Mutex<EntryTable>,
}

impl<C: AsyncHttpClient + 'static> HttpElevationLoader<C> {
    /// Creates a loader.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client
    /// * `url_template` - URL with `{z}`, `{x}` and `{y}` placeholders
    pub fn new(http: C, url_template: impl Into<String>) -> Self {
        Self {
            http: Arc::new(http),
            url_template: url_template.into(),
            table: Mutex::new(EntryTable::default()),
        }
    }

    /// Expands the URL template for a key.
    pub fn tile_url(&self, key: HeightTileKey) -> String {
        self.url_template
            .replace("{z}", &key.zoom.to_string())
            .replace("{x}", &key.coord.x.to_string())
            .replace("{y}", &key.coord.y.to_string())
    }

    /// Outstanding claims of a key.
    pub fn claim_count(&self, key: &HeightTileKey) -> usize {
        self.table
            .lock()
            .entries
            .get(key)
            .map(|e| e.claims)
            .unwrap_or(0)
    }

    /// Number of keys with a cached or in-flight payload.
    pub fn cached_len(&self) -> usize {
        self.table.lock().entries.len()
    }

    fn fetch(&self, key: HeightTileKey) -> SharedFetch {
        let http = Arc::clone(&self.http);
        let url = self.tile_url(key);
        async move {
            let n = 1_i64 << key.zoom;
            let (x, y) = (i64::from(key.coord.x), i64::from(key.coord.y));
            if x < 0 || y < 0 || x >= n || y >= n {
                return Err(ElevationError::OutOfRange(key));
            }
            let data = http
                .get(&url)
                .await
                .map_err(|e| ElevationError::Fetch(e.to_string()))?;
            if data.is_empty() {
                return Err(ElevationError::InvalidPayload {
                    key,
                    reason: "empty body".to_string(),
                });
            }
            debug!(key = %key, bytes = data.len(), "Fetched elevation tile");
            Ok(Arc::new(ElevationPayload::new(key, data)))
        }
        .boxed()
        .shared()
    }

    /// Rolls back a claim whose fetch failed, so a later claim retries.
    fn forget_failed(&self, key: HeightTileKey, generation: u64) {
        let mut table = self.table.lock();
        if table.entries.get(&key).map(|e| e.generation) == Some(generation) {
            table.entries.remove(&key);
        }
    }
}

impl<C: AsyncHttpClient + 'static> ElevationLoader for HttpElevationLoader<C> {
    fn claim(&self, key: HeightTileKey, owner: u64) -> BoxFuture<'_, PayloadResult> {
        let (generation, fetch) = {
            let mut guard = self.table.lock();
            let table = &mut *guard;
            let next_generation = &mut table.next_generation;
            let entry = table.entries.entry(key).or_insert_with(|| {
                let generation = *next_generation;
                *next_generation += 1;
                Entry {
                    generation,
                    claims: 0,
                    fetch: self.fetch(key),
                }
            });
            entry.claims += 1;
            (entry.generation, entry.fetch.clone())
        };
        trace!(key = %key, owner, "Elevation claim");

        async move {
            let result = fetch.await;
            if result.is_err() {
                self.forget_failed(key, generation);
            }
            result
        }
        .boxed()
    }

    fn release(&self, key: HeightTileKey) {
        let mut table = self.table.lock();
        let Some(entry) = table.entries.get_mut(&key) else {
            return;
        };
        entry.claims = entry.claims.saturating_sub(1);
        if entry.claims == 0 {
            table.entries.remove(&key);
            trace!(key = %key, "Dropped elevation payload");
        }
    }
}
