//! Per-session mutable state backing stateful translation.
//!
//! Every cache is owned by exactly one session and shared between that
//! session's two I/O contexts, so each synchronizes internally. None of
//! this state outlives the session.

mod chunk;
mod entity;
mod inventory;
mod scoreboard;
mod teleport;

pub use chunk::{BlockLookup, BlockState, ChunkCache, ChunkColumn};
pub use entity::EntityCache;
pub use inventory::{Inventory, InventoryCache, PLAYER_WINDOW_ID};
pub use scoreboard::{Objective, ScoreboardCache};
pub use teleport::{TeleportCache, TeleportOutcome, TeleportRecord};

use std::sync::Arc;

/// The full cache set created with a session and released on close.
pub struct SessionCaches {
    pub entity: Arc<EntityCache>,
    pub chunk: Arc<ChunkCache>,
    pub inventory: Arc<InventoryCache>,
    pub teleport: Arc<TeleportCache>,
    pub scoreboard: Arc<ScoreboardCache>,
}

impl SessionCaches {
    pub fn new(cache_chunks: bool) -> Self {
        Self {
            entity: Arc::new(EntityCache::new()),
            chunk: Arc::new(ChunkCache::new(cache_chunks)),
            inventory: Arc::new(InventoryCache::new()),
            teleport: Arc::new(TeleportCache::new()),
            scoreboard: Arc::new(ScoreboardCache::new()),
        }
    }
}
