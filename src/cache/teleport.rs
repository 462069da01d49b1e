use crate::position::Position;
use std::sync::Mutex;

/// Per-axis tolerance when matching a reported position against a pending
/// teleport target. Accounts for the frontend's f32 rounding.
const CONFIRM_TOLERANCE: f64 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TeleportRecord {
    pub position: Position,
    pub teleport_id: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TeleportOutcome {
    /// No teleport outstanding; movement is trusted as-is.
    NonePending,
    /// The reported position matches; the record is cleared and the
    /// confirmation id must be relayed to the backend.
    Confirmed(i32),
    /// The reported position does not match the pending target. The
    /// movement must be dropped; the record stays until superseded.
    Mismatch,
}

/// Single-slot store for the latest backend-initiated teleport. A newer
/// teleport overwrites the previous one, because only the latest can
/// still be confirmed.
pub struct TeleportCache {
    slot: Mutex<Option<TeleportRecord>>,
}

impl TeleportCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn record(&self, position: Position, teleport_id: i32) {
        let mut slot = self.slot.lock().expect("teleport cache poisoned");
        *slot = Some(TeleportRecord {
            position,
            teleport_id,
        });
    }

    pub fn pending(&self) -> Option<TeleportRecord> {
        *self.slot.lock().expect("teleport cache poisoned")
    }

    /// Checks a reported movement against the pending record.
    pub fn confirm(&self, reported: Position) -> TeleportOutcome {
        let mut slot = self.slot.lock().expect("teleport cache poisoned");
        let Some(record) = *slot else {
            return TeleportOutcome::NonePending;
        };
        if (record.position.x - reported.x).abs() < CONFIRM_TOLERANCE
            && (record.position.y - reported.y).abs() < CONFIRM_TOLERANCE
            && (record.position.z - reported.z).abs() < CONFIRM_TOLERANCE
        {
            *slot = None;
            TeleportOutcome::Confirmed(record.teleport_id)
        } else {
            TeleportOutcome::Mismatch
        }
    }

    pub fn clear(&self) {
        *self.slot.lock().expect("teleport cache poisoned") = None;
    }
}

impl Default for TeleportCache {
    fn default() -> Self {
        Self::new()
    }
}
