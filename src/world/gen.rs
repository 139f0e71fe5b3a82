use std::sync::Arc;

use log::{debug, trace};
use noise::{NoiseFn, Seedable, SuperSimplex};
use rand::Rng;

use crate::config::GeneratorConfig;

use super::{Block, Chunk, ChunkCoord, World, WorldError};

pub const BIOME_OCEAN: u8 = 0;
pub const BIOME_PLAINS: u8 = 1;
pub const BIOME_BEACH: u8 = 16;

/// Fills chunk columns of one world on demand.
pub trait ChunkGenerator: Send + Sync {
    fn world(&self) -> &Arc<World>;

    /// Generates the chunk at `coord` into the world.
    fn generate_chunk(&self, coord: ChunkCoord) -> Result<(), WorldError>;
}

/// Fills chunks with a noise heightmap: bedrock floor, stone body, a few
/// layers of dirt and a grass or sand top, with water up to sea level.
pub struct WorldGenerator {
    config: GeneratorConfig,
    world: Arc<World>,
    noise: SuperSimplex,
}

impl WorldGenerator {
    pub fn new(config: GeneratorConfig, world: Arc<World>) -> WorldGenerator {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        debug!("Using seed {} for world generation", seed);

        WorldGenerator {
            config,
            world,
            noise: SuperSimplex::new().set_seed(seed),
        }
    }

    fn generate_into_chunk(&self, chunk: &mut Chunk) {
        let origin = chunk.coord().origin(0);

        for x in 0..16u8 {
            for z in 0..16u8 {
                let height = self.terrain_height(origin.x + x as i32, origin.z + z as i32);
                self.generate_column(chunk, x, z, height);
            }
        }
    }

    fn generate_column(&self, chunk: &mut Chunk, x: u8, z: u8, height: i32) {
        let min_y = chunk.dimension().min_y;
        let max_y = chunk.dimension().max_y();
        let sea_level = self.config.sea_level;
        let shore = height <= sea_level + 1;

        for y in min_y..=height {
            let block = if y == min_y {
                Block::BEDROCK
            } else if y < height - self.config.dirt_depth {
                Block::STONE
            } else if shore {
                Block::SAND
            } else if y < height {
                Block::DIRT
            } else {
                Block::GRASS_BLOCK
            };
            chunk.set_block(x, y, z, block);
        }

        // Flood up to sea level
        for y in height + 1..=sea_level.min(max_y - 1) {
            chunk.set_block(x, y, z, Block::WATER);
        }

        let biome = if height < sea_level {
            BIOME_OCEAN
        } else if shore {
            BIOME_BEACH
        } else {
            BIOME_PLAINS
        };
        chunk.set_biome(x, z, biome);
    }

    /// Surface height of the column at world `x`/`z`, kept inside the
    /// dimension with room for bedrock below.
    pub fn terrain_height(&self, x: i32, z: i32) -> i32 {
        let dimension = self.world.dimension();
        let noise_val = self.sample_noise_fractal(x, z);
        let height = self.config.base_height + (noise_val * self.config.amplitude) as i32;
        height.clamp(dimension.min_y + 1, dimension.max_y() - 1)
    }

    fn sample_noise_fractal(&self, x: i32, z: i32) -> f64 {
        let mut result = 0.0;
        let mut denom = 0.0;
        let mut scale = self.config.master_scale;

        let mut amplitude = 1.0;
        for _ in 0..self.config.octaves {
            result += amplitude * self.noise.get([x as f64 * scale, z as f64 * scale]);
            denom += amplitude;

            scale *= self.config.lacunarity;
            amplitude *= self.config.falloff;
        }

        result / denom
    }
}

impl ChunkGenerator for WorldGenerator {
    fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// A resident chunk is regenerated in place; otherwise a new one is built
    /// and loaded. A chunk that turns up while building wins over the new one
    /// and is regenerated instead, so writes racing with generation survive.
    fn generate_chunk(&self, coord: ChunkCoord) -> Result<(), WorldError> {
        if let Ok(chunk) = self.world.get_chunk(coord) {
            self.generate_into_chunk(&mut chunk.write());
        } else {
            let mut chunk = Chunk::empty(coord, self.world.dimension());
            self.generate_into_chunk(&mut chunk);
            if let Some(resident) = self.world.load_chunk_if_absent(chunk)? {
                self.generate_into_chunk(&mut resident.write());
            }
        }
        trace!("Generated chunk {}", coord);
        Ok(())
    }
}
