use crate::core::{constants::TILE_SIZE, geo::TileCoord};
use crate::prelude::{Arc, HashSet, Mutex};
use crate::tiles::{
    source::TileProvider,
    tile_image::{ReusableTile, TileImage},
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use image::RgbaImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Recycled slots kept around for reuse; anything beyond is freed
const RECYCLE_POOL_LIMIT: usize = 32;

/// Requests queued for the loader; misses beyond this wait for a later frame
pub const REQUEST_QUEUE_LIMIT: usize = 256;

/// Outstanding requests remembered for deduplication before the set is reset
const PENDING_LIMIT: usize = 1024;

/// In-memory tile provider using LRU eviction and a pool of recyclable slots.
///
/// Decoded tiles live in [`ReusableTile`] slots. An evicted slot is marked recycled
/// (unless a draw holds a pin on it) and parked in a small pool; the next insert refills
/// a parked slot instead of allocating, once nothing references it any more.
///
/// Misses are reported on a request channel (see [`TileCache::requests`]) so that the
/// host's loader can fetch and decode them off the drawing thread and hand the result
/// back through [`TileCache::insert`], or report a failed fetch with [`TileCache::fail`].
/// The queue is bounded: when it is full, a miss is simply not requested yet and the
/// next frame that sees it tries again.
#[derive(Debug)]
pub struct TileCache {
    entries: Mutex<LruCache<TileCoord, Arc<ReusableTile>>>,
    recycled: Mutex<Vec<Arc<ReusableTile>>>,
    pending: Mutex<HashSet<TileCoord>>,
    request_tx: Sender<TileCoord>,
    request_rx: Receiver<TileCoord>,
    use_data_connection: AtomicBool,
    tile_size: u32,
    min_zoom: u8,
    max_zoom: u8,
}

impl TileCache {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let (request_tx, request_rx) = bounded(REQUEST_QUEUE_LIMIT);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            recycled: Mutex::new(Vec::new()),
            pending: Mutex::new(HashSet::default()),
            request_tx,
            request_rx,
            use_data_connection: AtomicBool::new(true),
            tile_size: TILE_SIZE,
            min_zoom: 0,
            max_zoom: 18,
        }
    }

    /// Create a new tile cache with default capacity (64 tiles, grown on demand)
    pub fn with_default_capacity() -> Self {
        Self::new(64)
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Receiving end of the miss channel. A coordinate is sent once until it is inserted
    /// or reported as failed.
    pub fn requests(&self) -> Receiver<TileCoord> {
        self.request_rx.clone()
    }

    /// Report that loading `coord` failed, so the next miss requests it again.
    ///
    /// Returns whether the coordinate was outstanding.
    pub fn fail(&self, coord: &TileCoord) -> bool {
        let coord = coord.wrapped();
        let removed = self
            .pending
            .lock()
            .map(|mut pending| pending.remove(&coord))
            .unwrap_or(false);
        if removed {
            log::debug!("loading tile {} failed, will request again", coord);
        }
        removed
    }

    /// Number of requested coordinates not yet inserted or failed
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }

    /// Store decoded pixels for `coord`, evicting the least recently used tile if full
    pub fn insert(&self, coord: TileCoord, raster: RgbaImage) {
        let coord = coord.wrapped();
        let slot = self.take_slot(raster);

        // Lock order: pending, then entries. A miss re-checks entries under the
        // pending lock, so the tile is never requested again once it has landed.
        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        let evicted = match self.entries.lock() {
            Ok(mut entries) => entries.push(coord, slot),
            Err(_) => return,
        };
        pending.remove(&coord);
        drop(pending);

        if let Some((_, old)) = evicted {
            self.retire(old);
        }
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains(&coord.wrapped()))
            .unwrap_or(false)
    }

    /// Remove a tile from the cache
    pub fn remove(&self, coord: &TileCoord) -> bool {
        let removed = self
            .entries
            .lock()
            .ok()
            .and_then(|mut entries| entries.pop(&coord.wrapped()));
        match removed {
            Some(slot) => {
                self.retire(slot);
                true
            }
            None => false,
        }
    }

    /// Drop every tile and forget outstanding requests
    pub fn clear(&self) {
        let mut retired = Vec::new();
        if let Ok(mut entries) = self.entries.lock() {
            while let Some((_, slot)) = entries.pop_lru() {
                retired.push(slot);
            }
        }
        for slot in retired {
            self.retire(slot);
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.cap().get())
            .unwrap_or(0)
    }

    /// Number of parked slots waiting to be refilled
    pub fn recycled_len(&self) -> usize {
        self.recycled.lock().map(|pool| pool.len()).unwrap_or(0)
    }

    fn take_slot(&self, mut raster: RgbaImage) -> Arc<ReusableTile> {
        if let Ok(mut pool) = self.recycled.lock() {
            for index in (0..pool.len()).rev() {
                match ReusableTile::refill(&mut pool[index], raster) {
                    Ok(()) => return pool.swap_remove(index),
                    // Still referenced by a frame in flight, try the next one
                    Err(back) => raster = back,
                }
            }
        }
        ReusableTile::new(raster)
    }

    fn retire(&self, slot: Arc<ReusableTile>) {
        if !slot.try_recycle() {
            // Pinned by a draw; its pixels stay valid and are freed with the last reference
            log::trace!("evicted tile is pinned, not recycling");
            return;
        }
        if let Ok(mut pool) = self.recycled.lock() {
            if pool.len() < RECYCLE_POOL_LIMIT {
                pool.push(slot);
            }
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl TileProvider for TileCache {
    fn resolve(&self, coord: &TileCoord) -> Option<TileImage> {
        if coord.z < self.min_zoom || coord.z > self.max_zoom {
            return None;
        }

        let coord = coord.wrapped();
        let hit = self.entries.lock().ok()?.get(&coord).cloned();
        match hit {
            Some(slot) => Some(TileImage::Reusable(slot)),
            None => {
                let mut pending = self.pending.lock().ok()?;
                if let Some(slot) = self.entries.lock().ok()?.get(&coord) {
                    return Some(TileImage::Reusable(slot.clone()));
                }
                if pending.contains(&coord) {
                    return None;
                }
                if pending.len() >= PENDING_LIMIT {
                    // A loader that neither inserts nor fails; forget and re-request
                    log::debug!("dropping {} outstanding tile requests", pending.len());
                    pending.clear();
                }
                match self.request_tx.try_send(coord) {
                    Ok(()) => {
                        pending.insert(coord);
                    }
                    Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                        log::trace!("request queue full, deferring {}", coord);
                    }
                }
                None
            }
        }
    }

    fn ensure_capacity(&self, count: usize) {
        let Some(wanted) = NonZeroUsize::new(count) else {
            return;
        };
        if let Ok(mut entries) = self.entries.lock() {
            if wanted > entries.cap() {
                log::debug!("growing tile cache from {} to {}", entries.cap(), wanted);
                entries.resize(wanted);
            }
        }
    }

    fn use_data_connection(&self) -> bool {
        self.use_data_connection.load(Ordering::Relaxed)
    }

    fn set_use_data_connection(&self, enabled: bool) {
        self.use_data_connection.store(enabled, Ordering::Relaxed);
    }

    fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn tile_size_pixels(&self) -> u32 {
        self.tile_size
    }

    fn on_memory_pressure(&self) {
        if let Ok(mut pool) = self.recycled.lock() {
            let freed: usize = pool.iter().map(|slot| slot.byte_len()).sum();
            pool.clear();
            pool.shrink_to_fit();
            log::debug!("released {} bytes of recycled tile slots", freed);
        }
    }

    fn detach(&self) {
        self.clear();
    }
}
