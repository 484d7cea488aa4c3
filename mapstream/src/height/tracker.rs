//! Reference-counted elevation claims of resident map tiles.
//!
//! The tracker is owned by the lifecycle manager and only touched from its
//! update path, so the reference-count table needs no locking. Claims are
//! issued as a detached future; their results are applied later through
//! [`HeightDependencyTracker::commit`] or dropped through
//! [`HeightDependencyTracker::discard`] when the owning tile is gone.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::loader::{ElevationError, ElevationLoader, ElevationPayload};
use crate::coord::{zoom_offset, CoordError, HeightTileKey, TileCoord};

/// Failure of a tile's elevation claims.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeightClaimError {
    #[error("{failed} of {total} elevation claims failed (first: {key}): {source}")]
    ClaimsFailed {
        failed: usize,
        total: usize,
        key: HeightTileKey,
        source: ElevationError,
    },
}

/// Outcome of one claim request.
#[derive(Debug, Clone)]
pub struct HeightClaim {
    pub key: HeightTileKey,
    pub result: Result<Arc<ElevationPayload>, ElevationError>,
}

/// Claims applied to the reference-count table.
#[derive(Debug, Clone)]
pub struct CommittedClaims {
    /// Keys whose claim succeeded; each must be released exactly once.
    pub keys: Vec<HeightTileKey>,
    /// Payloads of every claim when all succeeded.
    pub outcome: Result<Vec<Arc<ElevationPayload>>, HeightClaimError>,
}

/// Tracks which elevation tiles resident map tiles depend on.
pub struct HeightDependencyTracker {
    loader: Arc<dyn ElevationLoader>,
    height_zoom: u8,
    zoom_offset: u8,
    ref_counts: HashMap<HeightTileKey, usize>,
}

impl HeightDependencyTracker {
    /// Creates a tracker for map tiles at `data_zoom` backed by elevation
    /// tiles at `height_zoom`.
    ///
    /// # Errors
    ///
    /// Fails if the zoom pair is invalid or `height_zoom` is finer than
    /// `data_zoom`.
    pub fn new(
        loader: Arc<dyn ElevationLoader>,
        data_zoom: u8,
        height_zoom: u8,
    ) -> Result<Self, CoordError> {
        Ok(Self {
            loader,
            height_zoom,
            zoom_offset: zoom_offset(data_zoom, height_zoom)?,
            ref_counts: HashMap::new(),
        })
    }

    /// Elevation tile containing a map tile.
    pub fn height_tile(&self, coord: TileCoord) -> TileCoord {
        coord.ancestor(self.zoom_offset)
    }

    /// Elevation keys a map tile depends on: the containing elevation tile
    /// and its 8 neighbors, row by row from the north-west.
    pub fn plan_claims(&self, coord: TileCoord) -> Vec<HeightTileKey> {
        let center = self.height_tile(coord);
        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .map(|(dx, dy)| HeightTileKey::new(center.offset(dx, dy), self.height_zoom))
            .collect()
    }

    /// Issues every claim of a map tile concurrently.
    ///
    /// The returned future does not borrow the tracker and resolves once all
    /// claims have settled.
    pub fn claim_all(
        &self,
        coord: TileCoord,
        owner: u64,
    ) -> impl Future<Output = Vec<HeightClaim>> + Send + 'static {
        let loader = Arc::clone(&self.loader);
        let keys = self.plan_claims(coord);
        async move {
            let results = join_all(keys.iter().map(|&key| loader.claim(key, owner))).await;
            keys.into_iter()
                .zip(results)
                .map(|(key, result)| HeightClaim { key, result })
                .collect()
        }
    }

    /// Records the successful claims of a resident tile.
    ///
    /// Successful claims are counted even when some other claim failed, so
    /// the owner must release [`CommittedClaims::keys`] on eviction either
    /// way.
    pub fn commit(&mut self, claims: Vec<HeightClaim>) -> CommittedClaims {
        let total = claims.len();
        let mut keys = Vec::with_capacity(total);
        let mut payloads = Vec::with_capacity(total);
        let mut failures: Vec<(HeightTileKey, ElevationError)> = Vec::new();

        for claim in claims {
            match claim.result {
                Ok(payload) => {
                    *self.ref_counts.entry(claim.key).or_insert(0) += 1;
                    keys.push(claim.key);
                    payloads.push(payload);
                }
                Err(error) => failures.push((claim.key, error)),
            }
        }

        let outcome = match failures.len() {
            0 => Ok(payloads),
            failed => {
                let (key, source) = failures.swap_remove(0);
                Err(HeightClaimError::ClaimsFailed {
                    failed,
                    total,
                    key,
                    source,
                })
            }
        };

        CommittedClaims { keys, outcome }
    }

    /// Returns the successful claims of a tile that was evicted while they
    /// were in flight. Reference counts are left untouched.
    pub fn discard(&self, claims: Vec<HeightClaim>) {
        for claim in claims.into_iter().filter(|c| c.result.is_ok()) {
            trace!(key = %claim.key, "Returning stale elevation claim");
            self.loader.release(claim.key);
        }
    }

    /// Releases committed claims, once per key.
    ///
    /// Reference counts never go below zero; a release without a matching
    /// commit is ignored.
    pub fn release(&mut self, keys: &[HeightTileKey]) {
        for key in keys {
            match self.ref_counts.get_mut(key) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    self.ref_counts.remove(key);
                    debug!(key = %key, "Elevation tile no longer referenced");
                }
                None => {
                    warn!(key = %key, "Release of untracked elevation claim ignored");
                    continue;
                }
            }
            self.loader.release(*key);
        }
    }

    /// Number of resident tiles holding a claim on `key`.
    pub fn ref_count(&self, key: &HeightTileKey) -> usize {
        self.ref_counts.get(key).copied().unwrap_or(0)
    }

    /// Every referenced key with its count.
    pub fn ref_counts(&self) -> impl Iterator<Item = (&HeightTileKey, &usize)> {
        self.ref_counts.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Loader that succeeds unless the key is listed as failing, recording
    /// every claim and release.
    #[derive(Default)]
    pub(crate) struct MockElevationLoader {
        pub failing: Mutex<HashSet<HeightTileKey>>,
        pub claims: Mutex<Vec<(HeightTileKey, u64)>>,
        pub releases: Mutex<Vec<HeightTileKey>>,
    }

    impl MockElevationLoader {
        pub fn outstanding(&self, key: &HeightTileKey) -> isize {
            let failing = self.failing.lock();
            let claimed = self
                .claims
                .lock()
                .iter()
                .filter(|(k, _)| k == key && !failing.contains(k))
                .count() as isize;
            let released = self.releases.lock().iter().filter(|k| *k == key).count() as isize;
            claimed - released
        }
    }

    impl ElevationLoader for MockElevationLoader {
        fn claim(
            &self,
            key: HeightTileKey,
            owner: u64,
        ) -> futures::future::BoxFuture<'_, Result<Arc<ElevationPayload>, ElevationError>> {
            self.claims.lock().push((key, owner));
            let fail = self.failing.lock().contains(&key);
            Box::pin(async move {
                if fail {
                    Err(ElevationError::Fetch(format!("{} unavailable", key)))
                } else {
                    Ok(Arc::new(ElevationPayload::new(key, vec![0; 4])))
                }
            })
        }

        fn release(&self, key: HeightTileKey) {
            self.releases.lock().push(key);
        }
    }

    fn tracker() -> (Arc<MockElevationLoader>, HeightDependencyTracker) {
        let loader = Arc::new(MockElevationLoader::default());
        let tracker = HeightDependencyTracker::new(loader.clone(), 16, 12).unwrap();
        (loader, tracker)
    }

    #[test]
    fn test_plan_claims_covers_neighborhood() {
        let (_, tracker) = tracker();
        let keys = tracker.plan_claims(TileCoord::new(35, 17));
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], HeightTileKey::new(TileCoord::new(1, 0), 12));
        assert_eq!(keys[4], HeightTileKey::new(TileCoord::new(2, 1), 12));
        assert_eq!(keys[8], HeightTileKey::new(TileCoord::new(3, 2), 12));
    }

    #[test]
    fn test_invalid_zoom_pair_rejected() {
        let loader = Arc::new(MockElevationLoader::default());
        assert!(HeightDependencyTracker::new(loader, 12, 16).is_err());
    }

    #[tokio::test]
    async fn test_commit_and_release_balance() {
        let (loader, mut tracker) = tracker();
        let a = tracker.claim_all(TileCoord::new(0, 0), 1).await;
        let b = tracker.claim_all(TileCoord::new(1, 0), 2).await;

        let a = tracker.commit(a);
        let b = tracker.commit(b);
        assert!(a.outcome.is_ok() && b.outcome.is_ok());

        let center = HeightTileKey::new(TileCoord::new(0, 0), 12);
        assert_eq!(tracker.ref_count(&center), 2);

        tracker.release(&a.keys);
        assert_eq!(tracker.ref_count(&center), 1);
        assert_eq!(loader.outstanding(&center), 1);

        tracker.release(&b.keys);
        assert_eq!(tracker.ref_count(&center), 0);
        assert_eq!(tracker.ref_counts().count(), 0);
        assert_eq!(loader.outstanding(&center), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_records_successful_claims() {
        let (loader, mut tracker) = tracker();
        let bad = HeightTileKey::new(TileCoord::new(1, 1), 12);
        loader.failing.lock().insert(bad);

        let claims = tracker.claim_all(TileCoord::new(0, 0), 7).await;
        let committed = tracker.commit(claims);

        assert_eq!(committed.keys.len(), 8);
        assert!(!committed.keys.contains(&bad));
        match committed.outcome {
            Err(HeightClaimError::ClaimsFailed {
                failed, total, key, ..
            }) => {
                assert_eq!((failed, total, key), (1, 9, bad));
            }
            Ok(_) => panic!("expected failure"),
        }
        assert_eq!(tracker.ref_count(&bad), 0);

        tracker.release(&committed.keys);
        assert_eq!(loader.releases.lock().len(), 8);
        assert!(!loader.releases.lock().contains(&bad));
    }

    #[test]
    fn test_release_never_goes_below_zero() {
        let (loader, mut tracker) = tracker();
        let key = HeightTileKey::new(TileCoord::new(0, 0), 12);
        tracker.release(&[key]);
        assert_eq!(tracker.ref_count(&key), 0);
        assert!(loader.releases.lock().is_empty());
    }

    #[tokio::test]
    async fn test_discard_releases_without_counting() {
        let (loader, tracker) = tracker();
        let claims = tracker.claim_all(TileCoord::new(0, 0), 3).await;
        tracker.discard(claims);
        assert_eq!(loader.releases.lock().len(), 9);
        assert_eq!(tracker.ref_counts().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_claims_are_distinct_neighbors_of_ancestor(
            x in -100_000i32..100_000,
            y in -100_000i32..100_000,
        ) {
            let (_, tracker) = tracker();
            let coord = TileCoord::new(x, y);
            let keys = tracker.plan_claims(coord);
            let unique: HashSet<_> = keys.iter().collect();
            prop_assert_eq!(unique.len(), 9);

            let center = TileCoord::new(x.div_euclid(16), y.div_euclid(16));
            prop_assert_eq!(keys[4].coord, center);
            for key in &keys {
                prop_assert_eq!(key.zoom, 12);
                prop_assert!((key.coord.x - center.x).abs() <= 1);
                prop_assert!((key.coord.y - center.y).abs() <= 1);
            }
        }
    }
}
