pub mod block;
pub mod chunk;
pub mod gen;
pub mod pos;
pub mod sched;

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, trace};
use parking_lot::RwLock;
use thiserror::Error;

pub use self::block::{Block, BlockInfo};
pub use self::chunk::{Chunk, Dimension, Section};
pub use self::pos::{ChunkCoord, LocalOffset, Position, Vec2f, Vec3d};

/// Shared handle to a resident chunk. The lock guards the chunk's contents;
/// the world map only guards which chunks exist.
pub type ChunkRef = Arc<RwLock<Chunk>>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    #[error("chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkCoord),
    #[error("block {0} is out of bounds")]
    BlockOutOfBounds(Position),
    #[error("chunk {0} does not match the world's vertical extent")]
    DimensionMismatch(ChunkCoord),
}

pub struct World {
    dimension: Dimension,
    chunks: DashMap<ChunkCoord, ChunkRef>,
}

impl Default for World {
    fn default() -> Self {
        World::new(Dimension::default())
    }
}

impl World {
    pub fn new(dimension: Dimension) -> World {
        World {
            dimension,
            chunks: DashMap::with_capacity(32),
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// The live chunk at `coord`. Writers may keep mutating it after this
    /// returns; take its lock for a consistent view.
    pub fn get_chunk(&self, coord: ChunkCoord) -> Result<ChunkRef, WorldError> {
        match self.chunks.get(&coord) {
            Some(chunk) => Ok(chunk.value().clone()),
            None => Err(WorldError::ChunkNotLoaded(coord)),
        }
    }

    pub fn is_chunk_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn loaded_chunks(&self) -> Vec<ChunkCoord> {
        self.chunks.iter().map(|entry| *entry.key()).collect()
    }

    /// Returns the chunk at `coord`, inserting a full-height one if none is
    /// resident. Check and insert happen under one shard lock, so racing
    /// callers all get the same chunk.
    fn create_chunk(&self, coord: ChunkCoord) -> ChunkRef {
        let dimension = self.dimension;
        self.chunks
            .entry(coord)
            .or_insert_with(|| {
                debug!("Auto-creating chunk {}", coord);
                Arc::new(RwLock::new(Chunk::new(coord, dimension)))
            })
            .value()
            .clone()
    }

    fn check_dimension(&self, chunk: &Chunk) -> Result<(), WorldError> {
        if chunk.dimension() != self.dimension {
            return Err(WorldError::DimensionMismatch(chunk.coord()));
        }
        Ok(())
    }

    /// Inserts `chunk` at its own coordinate, replacing whatever was there.
    /// The chunk must span the world's vertical extent.
    pub fn load_chunk(&self, chunk: Chunk) -> Result<(), WorldError> {
        self.check_dimension(&chunk)?;
        let coord = chunk.coord();
        if self
            .chunks
            .insert(coord, Arc::new(RwLock::new(chunk)))
            .is_some()
        {
            debug!("Replaced chunk {}", coord);
        } else {
            trace!("Loaded chunk {}", coord);
        }
        Ok(())
    }

    /// Inserts `chunk` unless its coordinate is already resident. On a hit
    /// the resident chunk is returned and `chunk` is dropped.
    pub fn load_chunk_if_absent(&self, chunk: Chunk) -> Result<Option<ChunkRef>, WorldError> {
        self.check_dimension(&chunk)?;
        let coord = chunk.coord();
        match self.chunks.entry(coord) {
            Entry::Occupied(entry) => Ok(Some(entry.get().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(RwLock::new(chunk)));
                trace!("Loaded chunk {}", coord);
                Ok(None)
            }
        }
    }

    /// Drops the chunk from the world. Handles obtained earlier stay usable
    /// by their holders.
    pub fn unload_chunk(&self, coord: ChunkCoord) -> Option<ChunkRef> {
        let removed = self.chunks.remove(&coord).map(|(_, chunk)| chunk);
        if removed.is_some() {
            trace!("Unloaded chunk {}", coord);
        }
        removed
    }

    pub fn get_block(&self, pos: Position) -> Result<Block, WorldError> {
        let chunk = self.get_chunk(pos.chunk_coord())?;
        let local = pos.local_offset();
        let chunk = chunk.read();
        chunk
            .get_block(local.x, local.y, local.z)
            .cloned()
            .ok_or(WorldError::BlockOutOfBounds(pos))
    }

    /// Writes a block, creating the chunk if it is not loaded. Heights
    /// outside the world are ignored, so this never fails.
    pub fn set_block(&self, pos: Position, block: Block) -> Result<(), WorldError> {
        let chunk = self.create_chunk(pos.chunk_coord());
        let local = pos.local_offset();
        chunk.write().set_block(local.x, local.y, local.z, block);
        Ok(())
    }

    /// Every readable block in the cube of side `2 * radius + 1` around
    /// `center`, ordered by x, then y, then z. Unloaded and out of bounds
    /// points are skipped, and so is the part of the cube past the `i32`
    /// limits. Costs one lookup per point.
    pub fn get_nearby_blocks(&self, center: Position, radius: i32) -> Vec<Block> {
        let mut blocks = Vec::new();
        if radius < 0 {
            return blocks;
        }

        let span = |c: i32| c.saturating_sub(radius)..=c.saturating_add(radius);
        for x in span(center.x) {
            for y in span(center.y) {
                for z in span(center.z) {
                    if let Ok(block) = self.get_block(Position::new(x, y, z)) {
                        blocks.push(block);
                    }
                }
            }
        }
        blocks
    }
}
