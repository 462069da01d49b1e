//! Movement validation and collision correction.
//!
//! Frontend movement reports are advisory: the client runs its own
//! physics against geometry that does not always match the backend's.
//! Before a report becomes a backend movement packet it is converted to
//! the backend coordinate frame, corrected against cached block geometry
//! (or a cheap heuristic when no geometry is cached), and sanity-checked
//! against the last known position.
//!
//! Everything here is pure over a block lookup closure so the same code
//! serves both the cache-backed and platform-backed world providers.

use crate::{
    cache::BlockLookup,
    entity::PLAYER_EYE_OFFSET,
    position::{Aabb, BlockPosition, Position, Vec3f},
    protocol::bedrock::MoveMode,
};

/// Reports whose summed per-axis delta exceeds this are treated as
/// implausible and rejected. Fixed threshold from the source protocol
/// stack; not derived.
pub const MOVEMENT_DISTANCE_LIMIT: f64 = 100.0;

/// Player collision footprint used for block resolution.
pub const PLAYER_COLLISION_WIDTH: f64 = 0.8;
pub const PLAYER_COLLISION_HEIGHT: f64 = 1.8;

/// Largest upward correction applied when the reported position clips
/// into a block. Covers slabs and fence-height hitboxes; anything deeper
/// is left for the teleport/resync path.
const MAX_STEP_HEIGHT: f64 = 0.5625;

/// Widens a frontend f32 coordinate through its decimal representation.
/// A plain `f64::from` drags the f32 rounding error along and makes
/// players stick against walls; round-tripping the shortest decimal form
/// does not.
pub fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or_else(|_| f64::from(value))
}

/// Converts a reported frontend position (eye-relative Y) to the backend
/// frame (feet-relative Y).
pub fn to_backend_position(reported: Vec3f) -> Position {
    Position {
        x: widen(reported.x),
        y: widen(reported.y) - PLAYER_EYE_OFFSET,
        z: widen(reported.z),
    }
}

/// Converts a backend-frame position back to the frontend frame.
pub fn to_frontend_position(position: Position) -> Vec3f {
    Vec3f {
        x: position.x as f32,
        y: (position.y + PLAYER_EYE_OFFSET) as f32,
        z: position.z as f32,
    }
}

/// Sanity check against teleport hacks and desyncs. Only `Normal`
/// movement is constrained; teleport/reset modes are server-driven.
/// A `false` result means the caller must resync the client instead of
/// forwarding anything.
pub fn is_valid_move(mode: MoveMode, current: Position, reported: Position) -> bool {
    if mode != MoveMode::Normal {
        return true;
    }
    let delta = current.delta_sum(reported);
    if delta > MOVEMENT_DISTANCE_LIMIT {
        tracing::debug!(delta, ?current, ?reported, "rejecting implausible movement");
        return false;
    }
    true
}

/// Fallback correction when no block geometry is cached: snap the
/// vertical coordinate up to the nearest half block while grounded, so
/// stairs and slabs behave like on the backend. Airborne reports pass
/// through unmodified.
pub fn snap_to_half_block(position: Position, on_ground: bool) -> Position {
    if !on_ground {
        return position;
    }
    Position {
        y: (position.y * 2.0).ceil() / 2.0,
        ..position
    }
}

/// Resolves the player bounding box against cached block geometry in a
/// window around the reported position, lifting the box out of any block
/// it clips into. `Unknown` lookups never collide: unexplored columns
/// must not produce false positives.
pub fn correct_position(
    position: Position,
    mut block_at: impl FnMut(BlockPosition) -> BlockLookup,
) -> Position {
    let mut player = Aabb::standing_at(position, PLAYER_COLLISION_WIDTH, PLAYER_COLLISION_HEIGHT);

    let half = PLAYER_COLLISION_WIDTH / 2.0;
    let min_x = (position.x - half).floor() as i32;
    let max_x = (position.x + half).floor() as i32;
    // Extends half a block down for fence-height hitboxes.
    let min_y = (position.y - 0.5).floor() as i32;
    let max_y = (position.y + PLAYER_COLLISION_HEIGHT).floor() as i32;
    let min_z = (position.z - half).floor() as i32;
    let max_z = (position.z + half).floor() as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                let block = BlockPosition::new(x, y, z);
                match block_at(block) {
                    BlockLookup::Unknown => continue,
                    BlockLookup::State(state) if state.is_air() => continue,
                    BlockLookup::State(_) => {}
                }
                // Shapes finer than a full cube are registry data owned
                // by the platform's block tables.
                let volume = Aabb::full_block(block);
                if !volume.intersects(&player) {
                    continue;
                }
                let lift = volume.max_y - player.min_y;
                if lift > 0.0 && lift <= MAX_STEP_HEIGHT {
                    player = player.translated(0.0, lift, 0.0);
                }
            }
        }
    }

    player.feet()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BlockState;

    #[test]
    fn small_delta_is_accepted() {
        let current = Position::new(0.0, 70.0, 0.0);
        let reported = Position::new(0.0, 70.01, 0.0);
        assert!(is_valid_move(MoveMode::Normal, current, reported));
    }

    #[test]
    fn implausible_delta_is_rejected_in_normal_mode_only() {
        let current = Position::new(0.0, 70.0, 0.0);
        let reported = Position::new(500.0, 70.0, 500.0);
        assert!(!is_valid_move(MoveMode::Normal, current, reported));
        assert!(is_valid_move(MoveMode::Teleport, current, reported));
        assert!(is_valid_move(MoveMode::Reset, current, reported));
    }

    #[test]
    fn grounded_report_snaps_up_to_half_block() {
        let snapped = snap_to_half_block(Position::new(1.0, 70.3, 1.0), true);
        assert_eq!(snapped.y, 70.5);
        // Already aligned positions stay put.
        assert_eq!(snap_to_half_block(snapped, true), snapped);
    }

    #[test]
    fn airborne_report_is_left_unmodified() {
        let reported = Position::new(1.0, 70.3, 1.0);
        assert_eq!(snap_to_half_block(reported, false), reported);
    }

    #[test]
    fn widening_preserves_decimal_representation() {
        assert_eq!(widen(0.1), 0.1);
        assert_eq!(widen(-12.3), -12.3);
        assert_ne!(f64::from(0.1_f32), 0.1);
    }

    #[test]
    fn frame_conversion_applies_eye_offset_both_ways() {
        let reported = Vec3f::new(8.0, 71.62, -2.0);
        let backend = to_backend_position(reported);
        assert_eq!(backend.y, 70.0);
        assert_eq!(to_frontend_position(backend), reported);
    }

    #[test]
    fn clipping_into_a_block_lifts_to_its_top() {
        // Solid floor occupies y 63..64; the player reports feet at 63.7.
        let floor = |block: BlockPosition| {
            if block.y == 63 {
                BlockLookup::State(BlockState(1))
            } else {
                BlockLookup::State(BlockState::AIR)
            }
        };
        let corrected = correct_position(Position::new(0.5, 63.7, 0.5), floor);
        assert!((corrected.y - 64.0).abs() < 1e-9);
        assert_eq!(corrected.x, 0.5);
        assert_eq!(corrected.z, 0.5);
    }

    #[test]
    fn unknown_geometry_never_collides() {
        let corrected =
            correct_position(Position::new(0.5, 63.7, 0.5), |_| BlockLookup::Unknown);
        assert_eq!(corrected, Position::new(0.5, 63.7, 0.5));
    }

    #[test]
    fn deep_clips_are_not_resolved_here() {
        // Feet a full block inside solid ground; lifting that far is the
        // resync path's job.
        let solid = |_| BlockLookup::State(BlockState(1));
        let reported = Position::new(0.5, 63.0, 0.5);
        let corrected = correct_position(reported, solid);
        assert_eq!(corrected, reported);
    }
}
