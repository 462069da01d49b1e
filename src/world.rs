//! Boundary to world/block state owned by the platform.

use crate::{cache::BlockLookup, position::BlockPosition, session::Session};

/// Synchronous block access used by movement validation. Implementations
/// must be safe to call from the frontend I/O context.
///
/// Platforms embedded in a server process typically answer from the live
/// world; the standalone proxy answers from the session's chunk cache.
pub trait WorldManager: Send + Sync {
    fn block_at(&self, session: &Session, position: BlockPosition) -> BlockLookup;
}

/// [`WorldManager`] backed by the per-session chunk cache. Reports
/// `Unknown` when the session is closed or caching is disabled, which
/// collision logic treats as non-colliding.
pub struct CachedWorldManager;

impl WorldManager for CachedWorldManager {
    fn block_at(&self, session: &Session, position: BlockPosition) -> BlockLookup {
        match session.chunk_cache() {
            Some(cache) => cache.block_at(position),
            None => BlockLookup::Unknown,
        }
    }
}
