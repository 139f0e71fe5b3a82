use serde_derive::Deserialize;

use super::{
    block::Block,
    pos::{section_index, ChunkCoord, CHUNK_WIDTH},
};

/// Number of blocks in one 16x16x16 section.
pub const SECTION_VOLUME: usize = 4096;

/// Vertical extent shared by every chunk of a world.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Dimension {
    /// Lowest buildable Y.
    pub min_y: i32,
    pub section_count: usize,
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension {
            min_y: -64,
            section_count: 24,
        }
    }
}

impl Dimension {
    pub fn new(min_y: i32, section_count: usize) -> Dimension {
        Dimension {
            min_y,
            section_count,
        }
    }

    /// One past the highest buildable Y, or `None` when the extent does not
    /// fit in `i32`.
    pub fn checked_max_y(&self) -> Option<i32> {
        let sections = i32::try_from(self.section_count).ok()?;
        self.min_y.checked_add(sections.checked_mul(CHUNK_WIDTH)?)
    }

    /// One past the highest buildable Y. Extents past `i32::MAX` are cut off
    /// there.
    pub fn max_y(&self) -> i32 {
        self.checked_max_y().unwrap_or(i32::MAX)
    }

    pub fn height(&self) -> i32 {
        i32::try_from(self.section_count)
            .unwrap_or(i32::MAX)
            .saturating_mul(CHUNK_WIDTH)
    }

    pub fn contains_y(&self, y: i32) -> bool {
        y >= self.min_y && y < self.max_y()
    }

    /// Validated section index for world height `y`.
    pub fn section_slot(&self, y: i32) -> Option<usize> {
        if !self.contains_y(y) {
            return None;
        }
        Some(section_index(y, self.min_y) as usize)
    }

    /// Lowest Y of section `idx`. Only meaningful for `idx < section_count`.
    pub fn section_base_y(&self, idx: usize) -> i32 {
        let base = i64::from(self.min_y) + idx as i64 * CHUNK_WIDTH as i64;
        base.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

#[derive(Clone, Debug)]
pub struct Section {
    base_y: i32,
    data: Box<[Block]>,
}

impl Section {
    /// An air-filled section whose lowest layer sits at world height `base_y`.
    pub fn new(base_y: i32) -> Section {
        Section {
            base_y,
            data: vec![Block::AIR; SECTION_VOLUME].into_boxed_slice(),
        }
    }

    pub fn base_y(&self) -> i32 {
        self.base_y
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < 16 && y < 16 && z < 16, "section offset out of range");
        y * 256 + z * 16 + x
    }

    pub fn get_block(&self, x: usize, y: usize, z: usize) -> &Block {
        &self.data[Self::index(x, y, z)]
    }

    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) {
        self.data[Self::index(x, y, z)] = block;
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Block::is_air)
    }
}

/// A full-height 16x16 column of sections.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    dimension: Dimension,
    sections: Vec<Option<Section>>,
    pub biomes: [u8; 256],
}

impl Chunk {
    /// A chunk with every section allocated, so every position in the
    /// column reads back as air.
    pub fn new(coord: ChunkCoord, dimension: Dimension) -> Chunk {
        let mut chunk = Chunk::empty(coord, dimension);
        for (idx, slot) in chunk.sections.iter_mut().enumerate() {
            *slot = Some(Section::new(dimension.section_base_y(idx)));
        }
        chunk
    }

    /// A chunk without any sections. Sections appear on first write.
    pub fn empty(coord: ChunkCoord, dimension: Dimension) -> Chunk {
        Chunk {
            coord,
            dimension,
            sections: vec![None; dimension.section_count],
            biomes: [0; 256],
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx).and_then(Option::as_ref)
    }

    pub fn allocated_sections(&self) -> usize {
        self.sections.iter().filter(|s| s.is_some()).count()
    }

    /// Block at local `x`/`z` and world `y`. `None` when `y` is outside the
    /// column or its section has not been allocated.
    pub fn get_block(&self, x: u8, y: i32, z: u8) -> Option<&Block> {
        let section_idx = self.dimension.section_slot(y)?;
        let section = self.sections[section_idx].as_ref()?;
        let local_y = (y - section.base_y()) as usize;
        Some(section.get_block(x as usize, local_y, z as usize))
    }

    /// Writes a block, allocating its section if needed. Heights outside the
    /// column are ignored.
    pub fn set_block(&mut self, x: u8, y: i32, z: u8, block: Block) {
        let section_idx = match self.dimension.section_slot(y) {
            Some(idx) => idx,
            None => return,
        };

        let base_y = self.dimension.section_base_y(section_idx);
        let section = self.sections[section_idx].get_or_insert_with(|| Section::new(base_y));
        let local_y = (y - section.base_y()) as usize;
        section.set_block(x as usize, local_y, z as usize, block)
    }

    pub fn set_biome(&mut self, x: u8, z: u8, biome: u8) {
        self.biomes[z as usize * 16 + x as usize] = biome;
    }

    pub fn biome(&self, x: u8, z: u8) -> u8 {
        self.biomes[z as usize * 16 + x as usize]
    }
}
