use crate::entity::{JavaEntityId, RuntimeEntityId, PLAYER_RUNTIME_ID};
use ahash::AHashMap;
use std::sync::Mutex;

/// Bijective mapping between backend entity ids and locally allocated
/// frontend runtime ids.
///
/// Entity updates arrive on the backend context while movement handling
/// reads the map from the frontend context, so all access goes through
/// one internal lock. Runtime ids are allocated from a monotonic counter
/// and never reused within a session; id 1 is reserved for the avatar.
pub struct EntityCache {
    inner: Mutex<Inner>,
}

struct Inner {
    next_runtime_id: u64,
    by_java: AHashMap<JavaEntityId, RuntimeEntityId>,
    by_runtime: AHashMap<RuntimeEntityId, JavaEntityId>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_runtime_id: PLAYER_RUNTIME_ID.as_u64() + 1,
                by_java: AHashMap::new(),
                by_runtime: AHashMap::new(),
            }),
        }
    }

    /// Allocates a runtime id for `java_id`, or returns the existing one
    /// if the entity is already tracked.
    pub fn register(&self, java_id: JavaEntityId) -> RuntimeEntityId {
        let mut inner = self.inner.lock().expect("entity cache poisoned");
        if let Some(&runtime_id) = inner.by_java.get(&java_id) {
            return runtime_id;
        }
        let runtime_id = RuntimeEntityId::new(inner.next_runtime_id);
        inner.next_runtime_id += 1;
        inner.by_java.insert(java_id, runtime_id);
        inner.by_runtime.insert(runtime_id, java_id);
        runtime_id
    }

    pub fn runtime_id(&self, java_id: JavaEntityId) -> Option<RuntimeEntityId> {
        self.inner
            .lock()
            .expect("entity cache poisoned")
            .by_java
            .get(&java_id)
            .copied()
    }

    pub fn java_id(&self, runtime_id: RuntimeEntityId) -> Option<JavaEntityId> {
        self.inner
            .lock()
            .expect("entity cache poisoned")
            .by_runtime
            .get(&runtime_id)
            .copied()
    }

    /// Drops the mapping when an entity leaves view. The freed runtime id
    /// is retired, not recycled.
    pub fn remove(&self, java_id: JavaEntityId) -> Option<RuntimeEntityId> {
        let mut inner = self.inner.lock().expect("entity cache poisoned");
        let runtime_id = inner.by_java.remove(&java_id)?;
        inner.by_runtime.remove(&runtime_id);
        Some(runtime_id)
    }

    /// Drops every tracked entity, e.g. on a dimension switch.
    pub fn clear(&self) -> Vec<RuntimeEntityId> {
        let mut inner = self.inner.lock().expect("entity cache poisoned");
        let removed = inner.by_runtime.keys().copied().collect();
        inner.by_java.clear();
        inner.by_runtime.clear();
        removed
    }

    pub fn tracked_count(&self) -> usize {
        self.inner
            .lock()
            .expect("entity cache poisoned")
            .by_java
            .len()
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}
