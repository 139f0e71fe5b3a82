use rand::Rng;
use serde_derive::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    registry::BlockRegistry,
    world::{Block, ChunkCoord, Position, Vec2f, Vec3d, World, WorldError},
};

pub const TYPE_PLAYER: i32 = 125;
pub const TYPE_ZOMBIE: i32 = 121;
pub const TYPE_ITEM: i32 = 76;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid game mode {0}")]
pub struct InvalidGameMode(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl TryFrom<u8> for GameMode {
    type Error = InvalidGameMode;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(GameMode::Survival),
            1 => Ok(GameMode::Creative),
            2 => Ok(GameMode::Adventure),
            3 => Ok(GameMode::Spectator),
            _ => Err(InvalidGameMode(val)),
        }
    }
}

/// Anything with a position in the world. Queries the world only through
/// its public block lookups.
#[derive(Debug, Clone)]
pub struct Entity {
    pub eid: i32,
    pub uuid: Uuid,
    pub kind: i32,
    pub position: Vec3d,
    pub velocity: Vec3d,
    pub rotation: Vec2f,
}

impl Entity {
    pub fn new(eid: i32, kind: i32) -> Entity {
        Entity::with_uuid(eid, kind, Uuid::from_u128(rand::thread_rng().gen()))
    }

    pub fn with_uuid(eid: i32, kind: i32, uuid: Uuid) -> Entity {
        Entity {
            eid,
            uuid,
            kind,
            position: Default::default(),
            velocity: Default::default(),
            rotation: Default::default(),
        }
    }

    pub fn is_player(&self) -> bool {
        self.kind == TYPE_PLAYER
    }

    /// Block the entity's feet are in.
    pub fn block_pos(&self) -> Position {
        self.position.to_position()
    }

    pub fn chunk_coord(&self) -> ChunkCoord {
        self.block_pos().chunk_coord()
    }

    pub fn distance(&self, other: &Entity) -> f64 {
        self.position.distance(other.position)
    }

    pub fn block_below(&self, world: &World) -> Result<Block, WorldError> {
        world.get_block(self.block_pos().offset(0, -1, 0))
    }

    /// Standing on a solid block. Unloaded chunks and positions outside the
    /// world never count as ground.
    pub fn is_on_ground(&self, world: &World, registry: &BlockRegistry) -> bool {
        self.block_below(world)
            .map_or(false, |block| registry.is_solid(block.id))
    }

    pub fn surroundings(&self, world: &World, radius: i32) -> Vec<Block> {
        world.get_nearby_blocks(self.block_pos(), radius)
    }
}

pub struct Player {
    pub entity: Entity,
    pub name: String,
    pub game_mode: GameMode,
    pub health: f32,
    pub food: i32,
    pub saturation: f32,
    pub fly_speed: f32,
    pub walk_speed: f32,
}

impl Player {
    /// A player with the offline-mode UUID derived from `name`.
    pub fn new(eid: i32, name: impl Into<String>, game_mode: GameMode) -> Player {
        let name = name.into();
        let uuid = Uuid::new_v3(
            &Uuid::NAMESPACE_OID,
            format!("OfflinePlayer:{}", name).as_bytes(),
        );
        Player {
            entity: Entity::with_uuid(eid, TYPE_PLAYER, uuid),
            name,
            game_mode,
            health: 20.0,
            food: 20,
            saturation: 5.0,
            fly_speed: 0.05,
            walk_speed: 0.1,
        }
    }

    pub fn id(&self) -> i32 {
        self.entity.eid
    }

    pub fn uuid(&self) -> Uuid {
        self.entity.uuid
    }

    pub fn pos(&self) -> Vec3d {
        self.entity.position
    }

    pub fn set_pos(&mut self, pos: Vec3d) {
        self.entity.position = pos;
    }

    pub fn rot(&self) -> Vec2f {
        self.entity.rotation
    }

    pub fn set_rot(&mut self, rot: Vec2f) {
        self.entity.rotation = rot;
    }

    pub fn block_pos(&self) -> Position {
        self.entity.block_pos()
    }

    pub fn is_on_ground(&self, world: &World, registry: &BlockRegistry) -> bool {
        self.entity.is_on_ground(world, registry)
    }

    pub fn can_fly(&self) -> bool {
        matches!(self.game_mode, GameMode::Creative | GameMode::Spectator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_mode_from_u8() {
        assert_eq!(GameMode::try_from(1), Ok(GameMode::Creative));
        assert_eq!(GameMode::try_from(3), Ok(GameMode::Spectator));
        assert_eq!(GameMode::try_from(9), Err(InvalidGameMode(9)));
    }

    #[test]
    fn entity_position_floors() {
        let mut entity = Entity::new(4, TYPE_ZOMBIE);
        entity.position = Vec3d::new(-0.5, 64.0, 15.99);
        assert_eq!(entity.block_pos(), Position::new(-1, 64, 15));
        assert_eq!(entity.chunk_coord(), ChunkCoord::new(-1, 0));
        assert!(!entity.is_player());
    }

    #[test]
    fn ground_check_uses_registry() {
        let world = World::default();
        let registry = BlockRegistry::builtin();
        let mut entity = Entity::new(1, TYPE_ITEM);
        entity.position = Vec3d::new(0.5, 65.0, 0.5);

        // Nothing loaded yet
        assert!(!entity.is_on_ground(&world, &registry));
        assert_eq!(
            entity.block_below(&world),
            Err(WorldError::ChunkNotLoaded(ChunkCoord::new(0, 0)))
        );

        world.set_block(Position::new(0, 64, 0), Block::WATER).unwrap();
        assert!(!entity.is_on_ground(&world, &registry));

        world.set_block(Position::new(0, 64, 0), Block::STONE).unwrap();
        assert!(entity.is_on_ground(&world, &registry));

        entity.position.y = 65.7;
        assert!(entity.is_on_ground(&world, &registry));
        entity.position.y = 66.0;
        assert!(!entity.is_on_ground(&world, &registry));
    }

    #[test]
    fn block_below_at_bottom_of_range() {
        let world = World::default();
        world.set_block(Position::new(0, 0, 0), Block::STONE).unwrap();
        let mut entity = Entity::new(3, TYPE_ITEM);
        entity.position = Vec3d::new(0.5, i32::MIN as f64, 0.5);

        let below = Position::new(0, i32::MIN, 0);
        assert_eq!(entity.block_below(&world), Err(WorldError::BlockOutOfBounds(below)));
        assert!(!entity.is_on_ground(&world, &BlockRegistry::builtin()));
    }

    #[test]
    fn player_delegates_to_entity() {
        let mut player = Player::new(7, "Steve", GameMode::Survival);
        assert_eq!(player.id(), 7);
        assert!(player.entity.is_player());
        assert_eq!(player.uuid(), Player::new(8, "Steve", GameMode::Creative).uuid());
        assert!(!player.can_fly());

        player.set_pos(Vec3d::new(16.2, 70.0, -3.4));
        assert_eq!(player.pos(), player.entity.position);
        assert_eq!(player.block_pos(), Position::new(16, 70, -4));

        player.set_rot(Vec2f { x: 90.0, y: -10.0 });
        assert_eq!(player.rot().x, 90.0);

        let world = World::default();
        world.set_block(Position::new(16, 69, -4), Block::GRASS_BLOCK).unwrap();
        assert!(player.is_on_ground(&world, &BlockRegistry::builtin()));
    }

    #[test]
    fn surroundings_skip_unloaded() {
        let world = World::default();
        world.set_block(Position::new(15, 10, 8), Block::DIRT).unwrap();
        let mut entity = Entity::new(2, TYPE_ZOMBIE);
        entity.position = Vec3d::new(15.5, 10.0, 8.5);

        // x = 16 is in an unloaded chunk
        let blocks = entity.surroundings(&world, 1);
        assert_eq!(blocks.len(), 18);
        assert!(blocks.contains(&Block::DIRT));
    }
}
