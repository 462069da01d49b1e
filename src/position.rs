use serde::{Deserialize, Serialize};

/// Coordinate of one chunk column (16x16 blocks on the horizontal plane).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn chunk(self) -> ChunkPosition {
        ChunkPosition {
            x: self.x.div_euclid(16),
            z: self.z.div_euclid(16),
        }
    }
}

/// Double-precision position in the backend (Java) coordinate frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn block(self) -> BlockPosition {
        BlockPosition {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    /// Sum of absolute per-axis deltas to `other`. Used by the
    /// implausible-movement check.
    pub fn delta_sum(self, other: Position) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

/// Single-precision position as carried by frontend (Bedrock) packets.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3f {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Position> for Vec3f {
    fn from(value: Position) -> Self {
        Self {
            x: value.x as f32,
            y: value.y as f32,
            z: value.z as f32,
        }
    }
}

/// Entity look direction. `head_yaw` only matters for the frontend,
/// which separates body and head rotation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch,
            head_yaw: yaw,
        }
    }
}

/// Axis-aligned bounding box in the backend coordinate frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Aabb {
    /// Box with the given footprint, centered on `position` horizontally
    /// and standing on it vertically.
    pub fn standing_at(position: Position, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self {
            min_x: position.x - half,
            min_y: position.y,
            min_z: position.z - half,
            max_x: position.x + half,
            max_y: position.y + height,
            max_z: position.z + half,
        }
    }

    /// Full-cube box for the block at `position`.
    pub fn full_block(position: BlockPosition) -> Self {
        Self {
            min_x: position.x as f64,
            min_y: position.y as f64,
            min_z: position.z as f64,
            max_x: position.x as f64 + 1.0,
            max_y: position.y as f64 + 1.0,
            max_z: position.z as f64 + 1.0,
        }
    }

    pub fn translated(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            min_z: self.min_z + dz,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
            max_z: self.max_z + dz,
        }
    }

    /// Strict overlap; touching faces do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
            && self.min_z < other.max_z
            && self.max_z > other.min_z
    }

    /// Point centered horizontally, at the bottom face. The inverse of
    /// [`Aabb::standing_at`].
    pub fn feet(&self) -> Position {
        Position {
            x: (self.min_x + self.max_x) / 2.0,
            y: self.min_y,
            z: (self.min_z + self.max_z) / 2.0,
        }
    }
}
