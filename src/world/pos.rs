use std::{fmt, ops::Add};

/// Side length of a chunk and a section, in blocks.
pub const CHUNK_WIDTH: i32 = 16;

/// Integer block position in world space.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Position {
        Position { x, y, z }
    }

    /// The chunk column containing this position. Arithmetic shift floors,
    /// so `x = -1` lands in chunk `-1` rather than `0`.
    pub const fn chunk_coord(&self) -> ChunkCoord {
        ChunkCoord::from_block_pos(self.x, self.z)
    }

    /// Position inside the owning chunk. Masking a two's complement integer
    /// with 15 is the floor modulo for a width of 16.
    pub const fn local_offset(&self) -> LocalOffset {
        LocalOffset {
            x: (self.x & 0x0f) as u8,
            y: self.y,
            z: (self.z & 0x0f) as u8,
        }
    }

    /// Shifted position. Components clamp at the `i32` limits.
    pub const fn offset(&self, dx: i32, dy: i32, dz: i32) -> Position {
        Position::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    pub fn to_vec3d(&self) -> Vec3d {
        Vec3d::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        self.offset(other.x, other.y, other.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

impl From<Vec3d> for Position {
    fn from(v: Vec3d) -> Self {
        v.to_position()
    }
}

/// Key of a chunk column in chunk-grid units.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> ChunkCoord {
        ChunkCoord { x, z }
    }

    pub const fn from_block_pos(x: i32, z: i32) -> ChunkCoord {
        ChunkCoord::new(x >> 4, z >> 4)
    }

    /// World position of this chunk's lowest x/z corner at height `y`.
    pub const fn origin(&self, y: i32) -> Position {
        Position::new(self.x << 4, y, self.z << 4)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.z)
    }
}

/// Offset inside a chunk column. `x` and `z` are in `0..16`; `y` stays in
/// world space and is resolved to a section by the chunk.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct LocalOffset {
    pub x: u8,
    pub y: i32,
    pub z: u8,
}

/// Index of the section holding world height `y` in a column whose lowest
/// buildable height is `min_y`. Only meaningful when it falls inside
/// `0..section_count`.
pub const fn section_index(y: i32, min_y: i32) -> i32 {
    // Widened, so the difference of two i32 heights cannot overflow.
    (y as i64 - min_y as i64).div_euclid(CHUNK_WIDTH as i64) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Vec3d {
        Vec3d { x, y, z }
    }

    /// Block occupied by this point. Each component is floored, never
    /// rounded: `-0.5` is inside block `-1`.
    pub fn to_position(&self) -> Position {
        Position::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    pub fn distance(&self, other: Vec3d) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Add for Vec3d {
    type Output = Vec3d;

    fn add(self, other: Vec3d) -> Vec3d {
        Vec3d::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl From<Position> for Vec3d {
    fn from(p: Position) -> Self {
        p.to_vec3d()
    }
}

/// Yaw and pitch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_and_local_rebuild_horizontal_position() {
        for x in -70..70 {
            for z in [-33, -17, -16, -1, 0, 15, 16, 31] {
                let p = Position::new(x, 5, z);
                let chunk = p.chunk_coord();
                let local = p.local_offset();
                assert_eq!(chunk.x * 16 + local.x as i32, p.x);
                assert_eq!(chunk.z * 16 + local.z as i32, p.z);
                assert!(local.x < 16 && local.z < 16);
                assert_eq!(local.y, 5);
            }
        }
    }

    #[test]
    fn negative_coordinates_floor() {
        assert_eq!(Position::new(-1, 0, -1).chunk_coord(), ChunkCoord::new(-1, -1));
        assert_eq!(Position::new(-16, 0, 0).chunk_coord(), ChunkCoord::new(-1, 0));
        assert_eq!(Position::new(-17, 0, 0).chunk_coord(), ChunkCoord::new(-2, 0));
        assert_eq!(Position::new(-1, 0, 0).local_offset().x, 15);
        assert_eq!(Position::new(0, 0, 0).chunk_coord(), ChunkCoord::new(0, 0));
    }

    #[test]
    fn chunk_origin() {
        let c = ChunkCoord::new(-2, 3);
        assert_eq!(c.origin(7), Position::new(-32, 7, 48));
        assert_eq!(c.origin(7).chunk_coord(), c);
    }

    #[test]
    fn section_index_uses_floor_division() {
        assert_eq!(section_index(-64, -64), 0);
        assert_eq!(section_index(-49, -64), 0);
        assert_eq!(section_index(-48, -64), 1);
        assert_eq!(section_index(0, -64), 4);
        assert_eq!(section_index(319, -64), 23);
        assert_eq!(section_index(320, -64), 24);
        assert_eq!(section_index(-65, -64), -1);
        assert_eq!(section_index(-79, -64), -1);
        assert_eq!(section_index(i32::MAX, i32::MIN), (1 << 28) - 1);
        assert_eq!(section_index(i32::MIN, i32::MAX), -(1 << 28));
    }

    #[test]
    fn vector_conversion_floors() {
        assert_eq!(Vec3d::new(0.9, 64.99, -0.1).to_position(), Position::new(0, 64, -1));
        assert_eq!(Vec3d::new(-1.5, -0.0, 2.5).to_position(), Position::new(-2, 0, 2));
        let p = Position::new(-3, 70, 12);
        assert_eq!(Position::from(Vec3d::from(p)), p);
    }

    #[test]
    fn vector_math() {
        let a = Vec3d::new(1.0, 2.0, 3.0);
        let b = a + Vec3d::new(3.0, 4.0, 0.0);
        assert_eq!(b, Vec3d::new(4.0, 6.0, 3.0));
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(
            Position::new(1, 2, 3) + Position::new(-1, -2, -3),
            Position::default()
        );
    }

    #[test]
    fn offset_clamps_at_limits() {
        let top = Position::new(0, i32::MAX, 0);
        assert_eq!(top.offset(0, 1, 0), top);
        assert_eq!(
            Position::new(i32::MIN, 0, 5).offset(-1, -1, 0),
            Position::new(i32::MIN, -1, 5)
        );
        assert_eq!(top + Position::new(0, 10, 0), top);
    }
}
