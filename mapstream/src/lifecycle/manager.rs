//! Resident tile set management.
//!
//! The [`TileLifecycleManager`] owns every resident [`Tile`] and the
//! elevation reference counts. All state changes happen inside
//! [`TileLifecycleManager::update`] (or [`TileLifecycleManager::settle`]);
//! network work runs in spawned tasks that only report back over a channel.
//!
//! # Architecture
//!
//! ```text
//! update(camera)
//!   │
//!   ├─► drain completions ──► re-check residency ──► apply / discard
//!   │
//!   ├─► selector.select(camera) ──► candidates (nearest first)
//!   │
//!   ├─► flag in-frustum tiles, refresh distances
//!   │
//!   ├─► admit first non-resident candidate (at most one per tick)
//!   │        │
//!   │        └─► spawn: claim 3×3 elevation tiles ──► HeightsClaimed
//!   │                         (update path) ──► spawn: fetch features ──► FeaturesLoaded
//!   │
//!   └─► evict out-of-frustum tiles, farthest first, down to capacity
//! ```
//!
//! Each load step runs in its own task, watched by a second task that
//! reports an aborted step (panic or cancellation) as a failure, so every
//! spawned step yields exactly one completion.
//!
//! Completions carry the tile's coordinate and local id. A completion whose
//! tile is gone (or was replaced by a newer tile at the same coordinate) is
//! stale: its elevation claims are handed back to the loader and its
//! features are dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use glam::DVec2;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::mesh::MeshStage;
use super::tile::{LoadError, LoadState, Tile};
use crate::coord::{tile_center_meters, CoordError, TileCoord};
use crate::height::{ElevationLoader, HeightClaim, HeightDependencyTracker};
use crate::provider::TileRequest;
use crate::vector::{AggregateError, VectorFeatureAggregator, VectorFeatureCollection};
use crate::viewport::{Camera, ViewportTileSelector, DEFAULT_FAR_LIMIT};

// =============================================================================
// Configuration
// =============================================================================

/// Default maximum number of resident tiles.
pub const DEFAULT_MAX_RESIDENT: usize = 256;

/// Default zoom of map tiles.
pub const DEFAULT_DATA_ZOOM: u8 = 16;

/// Default zoom of elevation tiles.
pub const DEFAULT_HEIGHT_ZOOM: u8 = 12;

/// Lifecycle manager settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Resident tile budget.
    pub max_resident: usize,
    /// Zoom of map tiles.
    pub data_zoom: u8,
    /// Zoom of elevation tiles (not finer than `data_zoom`).
    pub height_zoom: u8,
    /// Far distance the frustum is clamped to, in meters.
    pub far_limit: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_resident: DEFAULT_MAX_RESIDENT,
            data_zoom: DEFAULT_DATA_ZOOM,
            height_zoom: DEFAULT_HEIGHT_ZOOM,
            far_limit: DEFAULT_FAR_LIMIT,
        }
    }
}

/// Counters since the manager was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    pub admitted: u64,
    pub evicted: u64,
    pub loaded: u64,
    pub failed: u64,
    /// Completions discarded because their tile had been evicted.
    pub stale: u64,
}

// =============================================================================
// Load events
// =============================================================================

/// Completion of a spawned load step.
#[derive(Debug)]
enum LoadEvent {
    HeightsClaimed {
        local_id: u64,
        coord: TileCoord,
        claims: Vec<HeightClaim>,
    },
    FeaturesLoaded {
        local_id: u64,
        coord: TileCoord,
        result: Result<VectorFeatureCollection, AggregateError>,
    },
    Aborted {
        local_id: u64,
        coord: TileCoord,
        reason: String,
    },
}

// =============================================================================
// Manager
// =============================================================================

/// Owns the resident tile set and drives per-frame admission and eviction.
///
/// `update` must be called from within a tokio runtime, since admission
/// spawns the load tasks.
pub struct TileLifecycleManager<M: MeshStage> {
    config: LifecycleConfig,
    selector: ViewportTileSelector,
    tracker: HeightDependencyTracker,
    aggregator: Arc<VectorFeatureAggregator>,
    mesh: M,
    tiles: HashMap<TileCoord, Tile<M::Payload>>,
    ids: HashMap<u64, TileCoord>,
    next_local_id: u64,
    in_flight: usize,
    events_tx: mpsc::UnboundedSender<LoadEvent>,
    events_rx: mpsc::UnboundedReceiver<LoadEvent>,
    stats: LifecycleStats,
}

impl<M: MeshStage> TileLifecycleManager<M> {
    /// Creates a manager.
    ///
    /// # Arguments
    ///
    /// * `config` - Budget and zoom levels
    /// * `loader` - Elevation subsystem
    /// * `aggregator` - Vector feature source
    /// * `mesh` - Consumer of finished tile data
    ///
    /// # Errors
    ///
    /// Fails if the zoom levels are invalid.
    pub fn new(
        config: LifecycleConfig,
        loader: Arc<dyn ElevationLoader>,
        aggregator: Arc<VectorFeatureAggregator>,
        mesh: M,
    ) -> Result<Self, CoordError> {
        let tracker = HeightDependencyTracker::new(loader, config.data_zoom, config.height_zoom)?;
        let selector = ViewportTileSelector::new(config.data_zoom, config.far_limit);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            selector,
            tracker,
            aggregator,
            mesh,
            tiles: HashMap::new(),
            ids: HashMap::new(),
            next_local_id: 1,
            in_flight: 0,
            events_tx,
            events_rx,
            stats: LifecycleStats::default(),
        })
    }

    /// Runs one frame: applies finished loads, then selects, admits and
    /// evicts tiles for `camera`.
    pub fn update(&mut self, camera: &Camera) {
        self.drain_events();
        let candidates = self.selector.select(camera);
        self.apply_candidates(&candidates, camera.ground_position());
    }

    /// Applies a ranked candidate list as if produced by the selector.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Tile coordinates, nearest first
    /// * `camera_ground` - Camera position on the ground plane, in world meters
    pub fn apply_candidates(&mut self, candidates: &[TileCoord], camera_ground: DVec2) {
        for tile in self.tiles.values_mut() {
            tile.in_frustum = false;
        }
        for coord in candidates {
            if let Some(tile) = self.tiles.get_mut(coord) {
                tile.in_frustum = true;
            }
        }

        let zoom = self.config.data_zoom;
        for tile in self.tiles.values_mut() {
            tile.distance = tile_center_meters(tile.coord, zoom).distance(camera_ground);
        }

        if let Some(&coord) = candidates.iter().find(|c| !self.tiles.contains_key(c)) {
            if self.make_room() {
                self.admit(coord, camera_ground);
            }
        }

        self.evict_to(self.config.max_resident);
    }

    /// Applies every load completion already delivered, without waiting.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Waits for every in-flight load step and applies it.
    ///
    /// Loads chain (claims, then features), so this keeps going until
    /// nothing is left in flight.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.events_rx.recv().await {
                Some(event) => self.apply_event(event),
                None => break,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Admission
    // -------------------------------------------------------------------------

    /// Makes space for one more tile, evicting the farthest out-of-frustum
    /// tile when at capacity. Returns false when no space can be made.
    fn make_room(&mut self) -> bool {
        let max = self.config.max_resident;
        if max == 0 {
            return false;
        }
        if self.tiles.len() < max {
            return true;
        }
        self.evict_to(max - 1);
        self.tiles.len() < max
    }

    fn admit(&mut self, coord: TileCoord, camera_ground: DVec2) {
        let local_id = self.next_local_id;
        self.next_local_id += 1;

        let mut tile = Tile::new(coord, local_id);
        tile.distance = tile_center_meters(coord, self.config.data_zoom).distance(camera_ground);
        self.tiles.insert(coord, tile);
        self.ids.insert(local_id, coord);
        self.stats.admitted += 1;
        debug!(tile = %coord, local_id, resident = self.tiles.len(), "Admitted tile");

        let claims = self.tracker.claim_all(coord, local_id);
        self.spawn_step(coord, local_id, "elevation", async move {
            LoadEvent::HeightsClaimed {
                local_id,
                coord,
                claims: claims.await,
            }
        });
    }

    fn spawn_feature_load(&mut self, coord: TileCoord, local_id: u64) {
        let aggregator = Arc::clone(&self.aggregator);
        let request = TileRequest::new(coord, self.config.data_zoom);
        self.spawn_step(coord, local_id, "feature", async move {
            LoadEvent::FeaturesLoaded {
                local_id,
                coord,
                result: aggregator.get_collection(request).await,
            }
        });
    }

    /// Spawns one load step and a watcher that forwards its completion, or
    /// an `Aborted` event when the step's task does not finish.
    fn spawn_step<F>(&mut self, coord: TileCoord, local_id: u64, step: &'static str, work: F)
    where
        F: Future<Output = LoadEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.in_flight += 1;
        let handle = tokio::spawn(work);
        tokio::spawn(async move {
            let event = match handle.await {
                Ok(event) => event,
                Err(e) => {
                    let reason = if e.is_panic() {
                        format!("{} task panicked", step)
                    } else {
                        format!("{} task cancelled", step)
                    };
                    LoadEvent::Aborted {
                        local_id,
                        coord,
                        reason,
                    }
                }
            };
            let _ = tx.send(event);
        });
    }

    // -------------------------------------------------------------------------
    // Completions
    // -------------------------------------------------------------------------

    fn is_resident(&self, coord: TileCoord, local_id: u64) -> bool {
        self.tiles.get(&coord).map(|t| t.local_id) == Some(local_id)
    }

    fn apply_event(&mut self, event: LoadEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            LoadEvent::HeightsClaimed {
                local_id,
                coord,
                claims,
            } => self.apply_heights(coord, local_id, claims),
            LoadEvent::FeaturesLoaded {
                local_id,
                coord,
                result,
            } => self.apply_features(coord, local_id, result),
            LoadEvent::Aborted {
                local_id,
                coord,
                reason,
            } => self.apply_aborted(coord, local_id, reason),
        }
    }

    fn apply_aborted(&mut self, coord: TileCoord, local_id: u64, reason: String) {
        if !self.is_resident(coord, local_id) {
            trace!(tile = %coord, local_id, "Discarding stale aborted load");
            self.stats.stale += 1;
            return;
        }
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return;
        };
        warn!(tile = %coord, local_id, reason = %reason, "Tile load aborted");
        tile.state = LoadState::Failed(LoadError::Aborted(reason));
        self.stats.failed += 1;
    }

    fn apply_heights(&mut self, coord: TileCoord, local_id: u64, claims: Vec<HeightClaim>) {
        if !self.is_resident(coord, local_id) {
            trace!(tile = %coord, local_id, "Discarding stale elevation claims");
            self.tracker.discard(claims);
            self.stats.stale += 1;
            return;
        }

        let committed = self.tracker.commit(claims);
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return;
        };
        tile.height_claims = committed.keys;

        match committed.outcome {
            Ok(heights) => {
                tile.heights = heights;
                self.spawn_feature_load(coord, local_id);
            }
            Err(e) => {
                warn!(tile = %coord, error = %e, "Tile elevation claims failed");
                tile.state = LoadState::Failed(LoadError::Heights(e));
                self.stats.failed += 1;
            }
        }
    }

    fn apply_features(
        &mut self,
        coord: TileCoord,
        local_id: u64,
        result: Result<VectorFeatureCollection, AggregateError>,
    ) {
        if !self.is_resident(coord, local_id) {
            trace!(tile = %coord, local_id, "Discarding stale feature load");
            self.stats.stale += 1;
            return;
        }
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return;
        };

        match result {
            Ok(features) => {
                let heights = std::mem::take(&mut tile.heights);
                tile.payload = Some(self.mesh.build(coord, features, &heights));
                tile.heights = heights;
                tile.state = LoadState::Loaded;
                self.stats.loaded += 1;
                debug!(tile = %coord, local_id, "Tile loaded");
            }
            Err(e) => {
                warn!(tile = %coord, error = %e, "Tile feature load failed");
                tile.state = LoadState::Failed(LoadError::Features(e));
                self.stats.failed += 1;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Eviction
    // -------------------------------------------------------------------------

    /// Evicts out-of-frustum tiles, farthest first, until at most `target`
    /// remain or no out-of-frustum tile is left.
    fn evict_to(&mut self, target: usize) {
        if self.tiles.len() <= target {
            return;
        }

        let mut victims: Vec<(f64, u64, TileCoord)> = self
            .tiles
            .values()
            .filter(|t| !t.in_frustum)
            .map(|t| (t.distance, t.local_id, t.coord))
            .collect();
        victims.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let excess = self.tiles.len() - target;
        for (_, _, coord) in victims.into_iter().take(excess) {
            self.evict(coord);
        }
    }

    fn evict(&mut self, coord: TileCoord) {
        let Some(tile) = self.tiles.remove(&coord) else {
            return;
        };
        self.ids.remove(&tile.local_id);
        self.tracker.release(&tile.height_claims);
        self.stats.evicted += 1;
        debug!(
            tile = %coord,
            local_id = tile.local_id,
            distance = tile.distance,
            pending = tile.state == LoadState::Pending,
            "Evicted tile"
        );
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get_tile(&self, coord: TileCoord) -> Option<&Tile<M::Payload>> {
        self.tiles.get(&coord)
    }

    pub fn tile_by_local_id(&self, local_id: u64) -> Option<&Tile<M::Payload>> {
        self.ids.get(&local_id).and_then(|c| self.tiles.get(c))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile<M::Payload>> {
        self.tiles.values()
    }

    pub fn resident_count(&self) -> usize {
        self.tiles.len()
    }

    /// Load steps spawned but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn stats(&self) -> LifecycleStats {
        self.stats
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Elevation reference counts.
    pub fn height_tracker(&self) -> &HeightDependencyTracker {
        &self.tracker
    }
}
