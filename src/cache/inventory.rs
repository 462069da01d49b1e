use ahash::AHashMap;
use std::sync::Mutex;

/// Window id reserved for the player's own inventory. Present for the
/// whole session; a close request for it is ignored.
pub const PLAYER_WINDOW_ID: u8 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub window_id: u8,
    pub kind: String,
    pub title: String,
}

impl Inventory {
    fn player() -> Self {
        Self {
            window_id: PLAYER_WINDOW_ID,
            kind: String::from("minecraft:inventory"),
            title: String::new(),
        }
    }
}

/// Open windows by id, mirroring what the backend believes is open.
pub struct InventoryCache {
    windows: Mutex<AHashMap<u8, Inventory>>,
}

impl InventoryCache {
    pub fn new() -> Self {
        let mut windows = AHashMap::new();
        windows.insert(PLAYER_WINDOW_ID, Inventory::player());
        Self {
            windows: Mutex::new(windows),
        }
    }

    pub fn open_window(&self, window_id: u8, kind: String, title: String) {
        if window_id == PLAYER_WINDOW_ID {
            tracing::debug!("backend tried to re-open the player inventory window");
            return;
        }
        let mut windows = self.windows.lock().expect("inventory cache poisoned");
        windows.insert(
            window_id,
            Inventory {
                window_id,
                kind,
                title,
            },
        );
    }

    /// Returns whether a window was actually open. Window 0 always reports
    /// `false` and stays present.
    pub fn close_window(&self, window_id: u8) -> bool {
        if window_id == PLAYER_WINDOW_ID {
            return false;
        }
        let mut windows = self.windows.lock().expect("inventory cache poisoned");
        windows.remove(&window_id).is_some()
    }

    pub fn window(&self, window_id: u8) -> Option<Inventory> {
        let windows = self.windows.lock().expect("inventory cache poisoned");
        windows.get(&window_id).cloned()
    }

    pub fn open_count(&self) -> usize {
        self.windows.lock().expect("inventory cache poisoned").len()
    }
}

impl Default for InventoryCache {
    fn default() -> Self {
        Self::new()
    }
}
