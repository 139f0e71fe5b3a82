use std::{env, error::Error, sync::Arc};

use log::{info, warn};
use minecraft_world::{
    config::{ConfigError, WorldConfig},
    model::Player,
    registry::BlockRegistry,
    world::{gen::WorldGenerator, sched::GenerationScheduler, ChunkCoord, Vec3d, World},
};

fn load_config(path: &str) -> Result<WorldConfig, ConfigError> {
    match WorldConfig::load(path) {
        Err(ConfigError::Io(err)) => {
            warn!("Could not read {} ({}), using defaults", path, err);
            Ok(WorldConfig::default())
        }
        result => result,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "world.toml".to_string());
    let config = load_config(&config_path)?;
    let registry = match &config.registry_path {
        Some(path) => BlockRegistry::load(path)?,
        None => BlockRegistry::builtin(),
    };
    info!(
        "Using {} blocks from registry version {}",
        registry.len(),
        registry.version()
    );

    let world = Arc::new(World::new(config.dimension));
    let generator = Arc::new(WorldGenerator::new(config.generator.clone(), world.clone()));
    let sched = GenerationScheduler::new(generator.clone());
    let workers = sched.start(config.gen_threads);

    let spawn_chunk = ChunkCoord::new(0, 0);
    sched.request_region(spawn_chunk, config.preload_radius);
    sched.await_region(spawn_chunk, config.preload_radius);
    info!("Generated {} chunks around spawn", world.chunk_count());

    let height = generator.terrain_height(0, 0);
    let mut player = Player::new(1, "Steve", config.game_mode);
    player.set_pos(Vec3d::new(0.5, (height + 1) as f64, 0.5));

    let nearby = player.entity.surroundings(&world, 2);
    let solid = nearby.iter().filter(|b| registry.is_solid(b.id)).count();
    info!(
        "{} spawned at {:?} (on ground: {}), {} of {} nearby blocks are solid",
        player.name,
        player.block_pos(),
        player.is_on_ground(&world, &registry),
        solid,
        nearby.len()
    );

    drop(sched);
    for worker in workers {
        if worker.join().is_err() {
            warn!("Generation worker panicked");
        }
    }
    Ok(())
}
