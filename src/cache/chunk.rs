use crate::position::{BlockPosition, ChunkPosition};
use ahash::AHashMap;
use std::sync::Mutex;

/// Global palette id of a backend block state. Id 0 is air.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockState(pub u32);

impl BlockState {
    pub const AIR: BlockState = BlockState(0);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Result of a block lookup. `Unknown` (column never cached, or caching
/// disabled) is deliberately distinct from air: collision logic must treat
/// unknown ground as non-colliding instead of guessing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockLookup {
    Unknown,
    State(BlockState),
}

/// One decoded chunk column. Sparse: only non-air blocks are stored, so an
/// absent entry inside a cached column reads as air.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkColumn {
    pub position: ChunkPosition,
    blocks: AHashMap<BlockPosition, BlockState>,
}

impl ChunkColumn {
    pub fn new(position: ChunkPosition) -> Self {
        Self {
            position,
            blocks: AHashMap::new(),
        }
    }

    /// Records a block at world coordinates. Air entries are dropped to
    /// keep the sparse representation canonical.
    pub fn set_block(&mut self, position: BlockPosition, state: BlockState) {
        debug_assert_eq!(position.chunk(), self.position);
        if state.is_air() {
            self.blocks.remove(&position);
        } else {
            self.blocks.insert(position, state);
        }
    }

    pub fn block_at(&self, position: BlockPosition) -> BlockState {
        self.blocks.get(&position).copied().unwrap_or(BlockState::AIR)
    }
}

/// Cached block geometry for the columns the backend has sent, used by
/// movement validation. Only populated when chunk caching is enabled in
/// the proxy configuration; when disabled every lookup is `Unknown` and
/// the validator falls back to its cheap heuristic.
pub struct ChunkCache {
    enabled: bool,
    columns: Mutex<AHashMap<ChunkPosition, ChunkColumn>>,
}

impl ChunkCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            columns: Mutex::new(AHashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn insert_column(&self, column: ChunkColumn) {
        if !self.enabled {
            return;
        }
        let mut columns = self.columns.lock().expect("chunk cache poisoned");
        columns.insert(column.position, column);
    }

    pub fn remove_column(&self, position: ChunkPosition) {
        let mut columns = self.columns.lock().expect("chunk cache poisoned");
        columns.remove(&position);
    }

    pub fn block_at(&self, position: BlockPosition) -> BlockLookup {
        if !self.enabled {
            return BlockLookup::Unknown;
        }
        let columns = self.columns.lock().expect("chunk cache poisoned");
        match columns.get(&position.chunk()) {
            Some(column) => BlockLookup::State(column.block_at(position)),
            None => BlockLookup::Unknown,
        }
    }

    pub fn clear(&self) {
        self.columns.lock().expect("chunk cache poisoned").clear();
    }
}
