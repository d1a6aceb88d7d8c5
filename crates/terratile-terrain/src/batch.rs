//! Multi-threaded tile generation with per-tile cancellation.
//!
//! Tiles are independent, so a map is generated by handing each tile to a
//! worker pool. Completed tiles are delivered through a bounded channel and
//! pending tiles can be cancelled between tiles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::TerrainResult;
use crate::layout::TileCoord;
use crate::tile::{TileFields, TileSettings, generate_tile};

/// A finished tile, or the error that stopped it.
#[derive(Debug)]
pub struct GeneratedTile {
    /// The tile that was requested.
    pub coord: TileCoord,
    /// The generated fields.
    pub result: TerrainResult<TileFields>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

struct QueuedTile {
    coord: TileCoord,
    cancelled: Arc<AtomicBool>,
}

/// One worker per core, leaving a core for the caller.
pub fn default_thread_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Generates tiles of one map on a pool of worker threads.
pub struct AsyncTileGenerator {
    task_sender: Sender<QueuedTile>,
    result_receiver: Receiver<GeneratedTile>,
    /// Cancellation flag per pending tile.
    active_tasks: Arc<DashMap<TileCoord, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl AsyncTileGenerator {
    /// Spawn `thread_count` workers sharing `settings`.
    ///
    /// `max_queued` bounds the submission queue; `result_capacity` bounds the
    /// result channel, so workers block once that many tiles are undrained.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(
        settings: Arc<TileSettings>,
        thread_count: usize,
        max_queued: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTile>(max_queued.max(1));
        let (result_sender, result_receiver) = bounded::<GeneratedTile>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for worker in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let settings = Arc::clone(&settings);

            std::thread::Builder::new()
                .name(format!("tile-gen-{worker}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = Instant::now();
                        let result = generate_tile(&settings, queued.coord);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GeneratedTile {
                                coord: queued.coord,
                                result,
                                generation_time_us: elapsed,
                            });
                        } else {
                            tracing::trace!(tile = %queued.coord, "discarded cancelled tile");
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Queue a tile for background generation.
    ///
    /// Returns `Err(coord)` if the queue is full, or if `coord` is still
    /// pending (queued, executing, or finished but not yet drained).
    pub fn submit(&self, coord: TileCoord) -> Result<(), TileCoord> {
        let cancelled = Arc::new(AtomicBool::new(false));
        match self.active_tasks.entry(coord) {
            Entry::Occupied(_) => return Err(coord),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&cancelled));
            }
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedTile { coord, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let coord = e.into_inner().coord;
                self.active_tasks.remove(&coord);
                coord
            })
    }

    /// Cancel a pending or in-progress tile. No-op if it already completed.
    pub fn cancel(&self, coord: &TileCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Cancel every pending tile.
    pub fn cancel_all(&self) {
        let pending: Vec<TileCoord> = self.active_tasks.iter().map(|e| *e.key()).collect();
        for coord in &pending {
            self.cancel(coord);
        }
        if !pending.is_empty() {
            tracing::info!(cancelled = pending.len(), "cancelled pending tiles");
        }
    }

    /// Drain all completed tiles without blocking.
    pub fn drain_results(&self) -> Vec<GeneratedTile> {
        let mut results = Vec::new();
        while let Ok(tile) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&tile.coord);
            results.push(tile);
        }
        results
    }

    /// Block until `expected` tiles arrived or `timeout` elapsed, whichever
    /// comes first.
    pub fn collect(&self, expected: usize, timeout: Duration) -> Vec<GeneratedTile> {
        let deadline = Instant::now() + timeout;
        let mut results = Vec::with_capacity(expected);
        while results.len() < expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_receiver.recv_timeout(remaining) {
                Ok(tile) => {
                    self.active_tasks.remove(&tile.coord);
                    results.push(tile);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        received = results.len(),
                        expected,
                        "timed out waiting for tiles"
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        results
    }

    /// Number of tiles queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if `coord` is queued or executing.
    pub fn is_pending(&self, coord: &TileCoord) -> bool {
        self.active_tasks.contains_key(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::VisualizationType;
    use crate::tile::tests::test_settings;

    fn settings() -> Arc<TileSettings> {
        Arc::new(test_settings(VisualizationType::Height))
    }

    #[test]
    fn test_whole_map_generates() {
        let settings = settings();
        let generator = AsyncTileGenerator::new(Arc::clone(&settings), 3, 16, 16).unwrap();

        let mut submitted = 0;
        for coord in settings.layout.tiles() {
            if generator.submit(coord).is_ok() {
                submitted += 1;
            }
        }
        assert_eq!(submitted, settings.layout.tile_count());

        let results = generator.collect(submitted, Duration::from_secs(30));
        assert_eq!(results.len(), submitted);
        for tile in &results {
            let fields = tile.result.as_ref().unwrap();
            assert_eq!(fields.coord, tile.coord);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let settings = settings();
        let generator = AsyncTileGenerator::new(Arc::clone(&settings), 2, 16, 16).unwrap();
        let coord = TileCoord::new(1, 1);
        generator.submit(coord).unwrap();

        let results = generator.collect(1, Duration::from_secs(30));
        let parallel = results[0].result.as_ref().unwrap();
        let sequential = generate_tile(&settings, coord).unwrap();
        assert_eq!(*parallel, sequential);
    }

    #[test]
    fn test_full_queue_rejects() {
        let generator = AsyncTileGenerator::new(settings(), 1, 1, 1).unwrap();
        let mut rejected = 0;
        for x in 0..64 {
            if generator.submit(TileCoord::new(x, 0)).is_err() {
                rejected += 1;
            }
        }
        assert!(rejected > 0, "a one-slot queue should reject a burst of tiles");
        generator.cancel_all();
    }

    fn wait_idle(generator: &AsyncTileGenerator) -> Vec<GeneratedTile> {
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut results = Vec::new();
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            results.extend(generator.drain_results());
            std::thread::sleep(Duration::from_millis(10));
        }
        results.extend(generator.drain_results());
        results
    }

    #[test]
    fn test_cancelled_queued_tile_never_arrives() {
        // One worker and a one-slot result channel: once `first` sits in the
        // channel, the worker blocks sending `second`, so `queued` cannot be
        // picked up until results are drained.
        let generator = AsyncTileGenerator::new(settings(), 1, 8, 1).unwrap();
        let first = TileCoord::new(0, 0);
        let second = TileCoord::new(1, 0);
        let queued = TileCoord::new(0, 1);
        generator.submit(first).unwrap();
        generator.submit(second).unwrap();
        generator.submit(queued).unwrap();

        generator.cancel(&queued);
        assert!(!generator.is_pending(&queued));

        let mut results = generator.collect(2, Duration::from_secs(30));
        results.extend(wait_idle(&generator));
        let coords: Vec<TileCoord> = results.iter().map(|t| t.coord).collect();
        assert_eq!(coords, vec![first, second]);
        assert_eq!(generator.in_flight_count(), 0);
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let generator = AsyncTileGenerator::new(settings(), 1, 8, 8).unwrap();
        let coord = TileCoord::new(1, 1);
        generator.submit(coord).unwrap();
        assert_eq!(generator.submit(coord), Err(coord));

        // Once delivered, the tile can be requested again.
        let results = generator.collect(1, Duration::from_secs(30));
        assert_eq!(results.len(), 1);
        assert!(!generator.is_pending(&coord));
        generator.submit(coord).unwrap();
        let again = generator.collect(1, Duration::from_secs(30));
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].coord, coord);
    }

    #[test]
    fn test_resubmit_after_cancel() {
        let generator = AsyncTileGenerator::new(settings(), 1, 8, 8).unwrap();
        let coord = TileCoord::new(0, 1);
        generator.submit(coord).unwrap();
        generator.cancel(&coord);
        generator.submit(coord).unwrap();
        assert!(generator.is_pending(&coord));

        // At most the resubmitted tile is delivered; the cancelled one is dropped.
        let results = wait_idle(&generator);
        assert!(results.len() <= 1, "got {} results", results.len());
        assert!(results.iter().all(|t| t.coord == coord));
    }

    #[test]
    fn test_cancel_all_clears_pending() {
        let generator = AsyncTileGenerator::new(settings(), 1, 64, 64).unwrap();
        for x in 0..8 {
            let _ = generator.submit(TileCoord::new(x, 0));
        }
        generator.cancel_all();
        for x in 0..8 {
            assert!(!generator.is_pending(&TileCoord::new(x, 0)));
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            let _ = generator.drain_results();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(generator.in_flight_count(), 0);
    }
}
