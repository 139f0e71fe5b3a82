use std::{
    borrow::Cow,
    hash::{Hash, Hasher},
};

use serde_derive::{Deserialize, Serialize};

/// A stored block value. Two blocks are the same block when their id and
/// state match; the name is only for display.
#[derive(Clone, Debug)]
pub struct Block {
    pub id: u32,
    pub state: Option<u32>,
    pub name: Cow<'static, str>,
}

impl Block {
    pub const AIR: Block = Block::named(0, "minecraft:air");
    pub const STONE: Block = Block::named(1, "minecraft:stone");
    pub const GRASS_BLOCK: Block = Block::named(2, "minecraft:grass_block");
    pub const DIRT: Block = Block::named(3, "minecraft:dirt");
    pub const BEDROCK: Block = Block::named(7, "minecraft:bedrock");
    pub const WATER: Block = Block::named(9, "minecraft:water");
    pub const SAND: Block = Block::named(12, "minecraft:sand");

    pub const fn named(id: u32, name: &'static str) -> Block {
        Block {
            id,
            state: None,
            name: Cow::Borrowed(name),
        }
    }

    pub fn new(id: u32, state: Option<u32>, name: impl Into<Cow<'static, str>>) -> Block {
        Block {
            id,
            state,
            name: name.into(),
        }
    }

    pub fn with_state(mut self, state: u32) -> Block {
        self.state = Some(state);
        self
    }

    /// Empty, traversable space.
    pub fn is_air(&self) -> bool {
        let name: &str = &self.name;
        self.id == 0 || name.strip_prefix("minecraft:").unwrap_or(name) == "air"
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.state == other.state
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.state.hash(state);
    }
}

/// Static metadata for a block id, as served by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub solid: bool,
    #[serde(default)]
    pub hardness: f64,
}
