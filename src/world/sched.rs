use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use dashmap::DashSet;
use flume::{Receiver, Sender};
use log::{debug, error, warn};
use parking_lot::{Condvar, Mutex};

use super::{gen::ChunkGenerator, ChunkCoord, World};

/// Queues chunk generation onto a pool of worker threads. Each missing chunk
/// is queued at most once while it is pending.
pub struct GenerationScheduler {
    world: Arc<World>,
    generator: Arc<dyn ChunkGenerator>,
    pending: Arc<DashSet<ChunkCoord>>,
    idle: Arc<(Mutex<()>, Condvar)>,
    workers: AtomicUsize,
    request_tx: Sender<ChunkCoord>,
    request_rx: Receiver<ChunkCoord>,
}

impl GenerationScheduler {
    pub fn new(generator: Arc<dyn ChunkGenerator>) -> GenerationScheduler {
        let (tx, rx) = flume::unbounded();
        GenerationScheduler {
            world: generator.world().clone(),
            generator,
            pending: Arc::new(DashSet::new()),
            idle: Arc::new((Mutex::new(()), Condvar::new())),
            workers: AtomicUsize::new(0),
            request_tx: tx,
            request_rx: rx,
        }
    }

    /// Spawns the workers. They exit once the scheduler is dropped and the
    /// queue has drained. A chunk whose generation fails or panics is dropped
    /// from the pending set like a finished one.
    pub fn start(&self, num_threads: u32) -> Vec<JoinHandle<()>> {
        debug!("Starting {} generation workers", num_threads);
        self.workers.fetch_add(num_threads as usize, Ordering::SeqCst);

        (0..num_threads)
            .map(|_| {
                let generator = self.generator.clone();
                let pending = self.pending.clone();
                let idle = self.idle.clone();
                let rx = self.request_rx.clone();

                thread::spawn(move || {
                    while let Ok(coord) = rx.recv() {
                        let result =
                            panic::catch_unwind(AssertUnwindSafe(|| generator.generate_chunk(coord)));
                        match result {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => warn!("Failed to generate chunk {}: {}", coord, err),
                            Err(_) => error!("Generation of chunk {} panicked", coord),
                        }
                        pending.remove(&coord);

                        let (lock, cvar) = &*idle;
                        let _guard = lock.lock();
                        cvar.notify_all();
                    }
                })
            })
            .collect()
    }

    /// Requests every chunk within `r` of `center`. The square is cut off
    /// at the `i32` limits.
    pub fn request_region(&self, center: ChunkCoord, r: i32) {
        if r < 0 {
            return;
        }
        for x in center.x.saturating_sub(r)..=center.x.saturating_add(r) {
            for z in center.z.saturating_sub(r)..=center.z.saturating_add(r) {
                self.request_chunk(ChunkCoord::new(x, z));
            }
        }
    }

    pub fn request_chunk(&self, coord: ChunkCoord) {
        if self.world.is_chunk_loaded(coord) || !self.pending.insert(coord) {
            return;
        }

        if let Err(err) = self.request_tx.send(coord) {
            warn!("Failed to queue chunk {}: {}", coord, err);
            self.pending.remove(&coord);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Blocks until no chunk of the region is pending. Chunks that were
    /// never requested are not waited for. Returns `false` without waiting
    /// when chunks are pending but no workers were started.
    pub fn await_region(&self, center: ChunkCoord, r: i32) -> bool {
        let (lock, cvar) = &*self.idle;
        let mut guard = lock.lock();
        while self.region_pending(center, r) {
            if self.workers.load(Ordering::SeqCst) == 0 {
                warn!("Awaiting region around chunk {} with no generation workers", center);
                return false;
            }
            cvar.wait(&mut guard);
        }
        true
    }

    fn region_pending(&self, center: ChunkCoord, r: i32) -> bool {
        if r < 0 {
            return false;
        }
        let r = r as u32;
        self.pending
            .iter()
            .any(|c| c.x.abs_diff(center.x) <= r && c.z.abs_diff(center.z) <= r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::world::{gen::WorldGenerator, Block, Chunk, Position, WorldError};

    /// Loads empty chunks, except at `(0, 0)` where it panics.
    struct FaultyGenerator {
        world: Arc<World>,
    }

    impl ChunkGenerator for FaultyGenerator {
        fn world(&self) -> &Arc<World> {
            &self.world
        }

        fn generate_chunk(&self, coord: ChunkCoord) -> Result<(), WorldError> {
            if coord == ChunkCoord::new(0, 0) {
                panic!("no terrain at the origin");
            }
            self.world.load_chunk(Chunk::empty(coord, self.world.dimension()))
        }
    }

    fn scheduler(world: Arc<World>) -> GenerationScheduler {
        let config = GeneratorConfig {
            seed: Some(3),
            ..Default::default()
        };
        GenerationScheduler::new(Arc::new(WorldGenerator::new(config, world)))
    }

    #[test]
    fn generates_requested_region() {
        let world = Arc::new(World::default());
        let sched = scheduler(world.clone());
        let workers = sched.start(3);

        let center = ChunkCoord::new(4, -4);
        sched.request_region(center, 1);
        assert!(sched.await_region(center, 1));

        assert_eq!(sched.pending_count(), 0);
        assert_eq!(world.chunk_count(), 9);
        for x in 3..=5 {
            for z in -5..=-3 {
                assert!(world.is_chunk_loaded(ChunkCoord::new(x, z)));
            }
        }

        drop(sched);
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn skips_loaded_chunks() {
        let world = Arc::new(World::default());
        world.set_block(Position::new(0, 100, 0), Block::SAND).unwrap();

        let sched = scheduler(world.clone());
        sched.request_chunk(ChunkCoord::new(0, 0));
        assert_eq!(sched.pending_count(), 0);

        // No workers yet, so requests stay queued and deduplicated
        sched.request_chunk(ChunkCoord::new(1, 0));
        sched.request_chunk(ChunkCoord::new(1, 0));
        assert_eq!(sched.pending_count(), 1);

        let workers = sched.start(1);
        assert!(sched.await_region(ChunkCoord::new(1, 0), 0));
        assert!(world.is_chunk_loaded(ChunkCoord::new(1, 0)));
        assert_eq!(world.get_block(Position::new(0, 100, 0)), Ok(Block::SAND));

        drop(sched);
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn panicking_generation_still_completes_region() {
        let world = Arc::new(World::default());
        let sched = GenerationScheduler::new(Arc::new(FaultyGenerator {
            world: world.clone(),
        }));
        let workers = sched.start(1);

        let center = ChunkCoord::new(0, 0);
        sched.request_region(center, 1);
        assert!(sched.await_region(center, 1));

        assert_eq!(sched.pending_count(), 0);
        assert!(!world.is_chunk_loaded(center));
        assert_eq!(world.chunk_count(), 8);

        drop(sched);
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn await_without_workers_returns() {
        let world = Arc::new(World::default());
        let sched = scheduler(world);
        assert!(sched.await_region(ChunkCoord::new(0, 0), 2));

        sched.request_chunk(ChunkCoord::new(1, 1));
        assert!(!sched.await_region(ChunkCoord::new(0, 0), 2));
        assert_eq!(sched.pending_count(), 1);
    }

    #[test]
    fn region_at_grid_limits() {
        let world = Arc::new(World::default());
        let sched = scheduler(world);
        let corner = ChunkCoord::new(i32::MAX, i32::MIN);
        sched.request_region(corner, 1);
        assert_eq!(sched.pending_count(), 4);
        assert!(!sched.await_region(corner, 1));
    }
}
