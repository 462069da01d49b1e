use ahash::AHashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub name: String,
    pub display_name: String,
}

/// Scoreboard objectives the backend has registered, so display updates
/// can be re-emitted for the frontend after dimension switches.
pub struct ScoreboardCache {
    objectives: Mutex<AHashMap<String, Objective>>,
}

impl ScoreboardCache {
    pub fn new() -> Self {
        Self {
            objectives: Mutex::new(AHashMap::new()),
        }
    }

    pub fn register(&self, name: String, display_name: String) {
        let mut objectives = self.objectives.lock().expect("scoreboard cache poisoned");
        objectives.insert(
            name.clone(),
            Objective { name, display_name },
        );
    }

    pub fn remove(&self, name: &str) -> Option<Objective> {
        let mut objectives = self.objectives.lock().expect("scoreboard cache poisoned");
        objectives.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Objective> {
        let objectives = self.objectives.lock().expect("scoreboard cache poisoned");
        objectives.get(name).cloned()
    }

    /// Drops every objective, returning them so their removal can be
    /// replayed to the frontend.
    pub fn clear(&self) -> Vec<Objective> {
        let mut objectives = self.objectives.lock().expect("scoreboard cache poisoned");
        objectives.drain().map(|(_, objective)| objective).collect()
    }
}

impl Default for ScoreboardCache {
    fn default() -> Self {
        Self::new()
    }
}
