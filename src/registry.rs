use std::{collections::HashMap, fs, path::Path};

use log::debug;
use serde_derive::Deserialize;
use thiserror::Error;

use crate::world::{Block, BlockInfo};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read block registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse block registry: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate block id {0}")]
    DuplicateId(u32),
    #[error("duplicate block name {0}")]
    DuplicateName(String),
}

#[derive(Deserialize)]
struct RegistryFile {
    version: String,
    #[serde(default)]
    blocks: Vec<BlockInfo>,
}

/// Catalog of block metadata for one game version. Built once by the owner
/// and handed by reference to whatever needs solidity or hardness.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    version: String,
    blocks: HashMap<u32, BlockInfo>,
    by_name: HashMap<String, u32>,
}

impl BlockRegistry {
    pub fn new(version: impl Into<String>) -> BlockRegistry {
        BlockRegistry {
            version: version.into(),
            ..Default::default()
        }
    }

    /// The handful of blocks the world generator places.
    pub fn builtin() -> BlockRegistry {
        let mut registry = BlockRegistry::new("builtin");
        let entries = [
            (Block::AIR, false, 0.0),
            (Block::STONE, true, 1.5),
            (Block::GRASS_BLOCK, true, 0.6),
            (Block::DIRT, true, 0.5),
            (Block::BEDROCK, true, -1.0),
            (Block::WATER, false, 100.0),
            (Block::SAND, true, 0.5),
        ];
        for (block, solid, hardness) in entries {
            registry.blocks.insert(
                block.id,
                BlockInfo {
                    id: block.id,
                    name: block.name.to_string(),
                    solid,
                    hardness,
                },
            );
            registry.by_name.insert(block.name.to_string(), block.id);
        }
        registry
    }

    pub fn from_toml_str(data: &str) -> Result<BlockRegistry, RegistryError> {
        let file = toml::from_str::<RegistryFile>(data)?;
        let mut registry = BlockRegistry::new(file.version);
        for info in file.blocks {
            registry.insert(info)?;
        }
        Ok(registry)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<BlockRegistry, RegistryError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let registry = Self::from_toml_str(&data)?;
        debug!(
            "Loaded {} blocks for version {} from {}",
            registry.len(),
            registry.version,
            path.display()
        );
        Ok(registry)
    }

    pub fn insert(&mut self, info: BlockInfo) -> Result<(), RegistryError> {
        if self.blocks.contains_key(&info.id) {
            return Err(RegistryError::DuplicateId(info.id));
        }
        if self.by_name.contains_key(&info.name) {
            return Err(RegistryError::DuplicateName(info.name));
        }
        self.by_name.insert(info.name.clone(), info.id);
        self.blocks.insert(info.id, info);
        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&BlockInfo> {
        self.blocks.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&BlockInfo> {
        self.by_name.get(name).and_then(|id| self.blocks.get(id))
    }

    /// Unknown ids are treated as passable.
    pub fn is_solid(&self, id: u32) -> bool {
        self.get(id).map_or(false, |info| info.solid)
    }

    pub fn hardness(&self, id: u32) -> Option<f64> {
        self.get(id).map(|info| info.hardness)
    }

    /// A storable block value for `id`, carrying the registry name.
    pub fn block(&self, id: u32) -> Option<Block> {
        self.get(id)
            .map(|info| Block::new(info.id, None, info.name.clone()))
    }
}
