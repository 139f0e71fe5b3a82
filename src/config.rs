use std::{fs, path::Path};

use serde_derive::Deserialize;
use thiserror::Error;

use crate::{model::GameMode, world::Dimension};

/// Tallest column a config may ask for, in sections.
pub const MAX_SECTION_COUNT: usize = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Random when absent.
    pub seed: Option<u32>,
    pub master_scale: f64,
    pub octaves: i32,
    pub falloff: f64,
    pub lacunarity: f64,
    /// Terrain height where the noise is zero.
    pub base_height: i32,
    /// Height swing at noise +-1.
    pub amplitude: f64,
    pub sea_level: i32,
    pub dirt_depth: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            seed: None,
            master_scale: 0.01,
            octaves: 4,
            falloff: 0.5,
            lacunarity: 2.0,
            base_height: 64,
            amplitude: 16.0,
            sea_level: 62,
            dirt_depth: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub dimension: Dimension,
    pub generator: GeneratorConfig,
    pub gen_threads: u32,
    /// Chunk radius generated around the origin at startup.
    pub preload_radius: i32,
    /// Falls back to the builtin block set when absent.
    pub registry_path: Option<String>,
    /// Game mode of players spawned into the world.
    pub game_mode: GameMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            dimension: Dimension::default(),
            generator: GeneratorConfig::default(),
            gen_threads: 2,
            preload_radius: 2,
            registry_path: None,
            game_mode: GameMode::Survival,
        }
    }
}

impl WorldConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<WorldConfig, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(data: &str) -> Result<WorldConfig, ConfigError> {
        let config = toml::from_str::<WorldConfig>(data)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension.section_count == 0 {
            return Err(ConfigError::Invalid("section_count must be positive".into()));
        }
        if self.dimension.section_count > MAX_SECTION_COUNT {
            return Err(ConfigError::Invalid(format!(
                "section_count must be at most {}",
                MAX_SECTION_COUNT
            )));
        }
        if self.dimension.checked_max_y().is_none() {
            return Err(ConfigError::Invalid(format!(
                "dimension starting at y = {} does not fit in 32 bits",
                self.dimension.min_y
            )));
        }
        if self.gen_threads == 0 {
            return Err(ConfigError::Invalid("gen_threads must be positive".into()));
        }
        if self.generator.octaves <= 0 {
            return Err(ConfigError::Invalid("octaves must be positive".into()));
        }
        if self.preload_radius < 0 {
            return Err(ConfigError::Invalid("preload_radius must not be negative".into()));
        }
        Ok(())
    }
}
