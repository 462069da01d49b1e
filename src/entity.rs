//! Entity identifiers and the player's shadow state.
//!
//! The frontend and backend use unrelated entity id spaces, so every
//! entity visible to a session carries both ids (see
//! [`crate::cache::EntityCache`] for the mapping).

use crate::position::{Position, Rotation};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Frontend (Bedrock) runtime entity id, allocated locally per session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuntimeEntityId(u64);

impl RuntimeEntityId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Backend (Java) entity id as assigned by the remote server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JavaEntityId(i32);

impl JavaEntityId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }
}

/// Runtime id reserved for the session's own avatar. Exists from session
/// creation and is never handed out by the entity cache.
pub const PLAYER_RUNTIME_ID: RuntimeEntityId = RuntimeEntityId(1);

/// Vertical offset between the backend's feet-relative Y and the
/// frontend's eye-relative Y for player entities. Applied consistently
/// in both directions; fixed by the protocols, not derived.
pub const PLAYER_EYE_OFFSET: f64 = 1.62;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    Byte(i8),
    Int(i32),
    Float(f32),
    String(String),
}

pub type EntityMetadata = AHashMap<u32, MetadataValue>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

/// Shadow copy of the session's own avatar, kept so movement can be
/// validated and authoritative state re-sent without a backend round trip.
/// Position is stored in the backend frame (feet Y, no eye offset).
#[derive(Clone, Debug)]
pub struct PlayerEntity {
    pub username: String,
    pub uuid: u128,
    pub java_id: JavaEntityId,
    pub position: Position,
    pub rotation: Rotation,
    pub on_ground: bool,
    pub dimension: i32,
    pub gamemode: GameMode,
    pub metadata: EntityMetadata,
}

impl PlayerEntity {
    pub fn new() -> Self {
        Self {
            username: String::from("unknown"),
            uuid: 0,
            java_id: JavaEntityId::new(0),
            position: Position::default(),
            rotation: Rotation::default(),
            on_ground: true,
            dimension: 0,
            gamemode: GameMode::default(),
            metadata: EntityMetadata::default(),
        }
    }
}

impl Default for PlayerEntity {
    fn default() -> Self {
        Self::new()
    }
}
