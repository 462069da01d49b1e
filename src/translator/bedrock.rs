//! Built-in translators for packets received from the frontend client.

use crate::{
    cache::{TeleportOutcome, PLAYER_WINDOW_ID},
    collision,
    entity::PLAYER_RUNTIME_ID,
    protocol::{bedrock, java},
    session::{Lifecycle, Session},
    translator::{BedrockTranslator, TranslatorRegistry},
};
use std::sync::Arc;

pub(super) fn register_builtin(registry: &mut TranslatorRegistry) {
    use bedrock::PacketKind;
    registry.register_bedrock(PacketKind::MovePlayer, 0, Box::new(MovePlayerTranslator));
    registry.register_bedrock(PacketKind::Respawn, 0, Box::new(RespawnTranslator));
    registry.register_bedrock(PacketKind::Text, 0, Box::new(TextTranslator));
    registry.register_bedrock(
        PacketKind::RequestChunkRadius,
        0,
        Box::new(RequestChunkRadiusTranslator),
    );
    registry.register_bedrock(PacketKind::ContainerClose, 0, Box::new(ContainerCloseTranslator));
    registry.register_bedrock(
        PacketKind::SetLocalPlayerAsInitialized,
        0,
        Box::new(SetLocalPlayerAsInitializedTranslator),
    );
    registry.register_bedrock(PacketKind::PlayerAction, 0, Box::new(PlayerActionTranslator));
}

/// The hot path: every client movement report runs teleport matching,
/// plausibility checking, and collision correction before anything
/// reaches the backend.
pub struct MovePlayerTranslator;

impl BedrockTranslator for MovePlayerTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::MovePlayer(packet) = packet else {
            return Ok(());
        };
        let reported = collision::to_backend_position(packet.position);

        if let Some(teleports) = session.teleport_cache() {
            match teleports.confirm(reported) {
                TeleportOutcome::Confirmed(id) => session.confirm_teleport(id),
                TeleportOutcome::Mismatch => {
                    // Client has not reached the teleport target yet; its
                    // stale movement must not leak to the backend.
                    tracing::debug!(?reported, "movement dropped, teleport unconfirmed");
                    return Ok(());
                }
                TeleportOutcome::NonePending => {}
            }
        }

        let current = session.player().position;
        if !collision::is_valid_move(packet.mode, current, reported) {
            session.recalculate_position();
            return Ok(());
        }

        let geometry_available = session
            .chunk_cache()
            .map(|chunks| chunks.is_enabled())
            .unwrap_or(false);
        let corrected = match session.connector() {
            Some(connector) if geometry_available => {
                let world = connector.world();
                collision::correct_position(reported, |block| world.block_at(session, block))
            }
            _ => collision::snap_to_half_block(reported, packet.on_ground),
        };

        {
            let mut player = session.player();
            player.position = corrected;
            player.rotation = packet.rotation;
            player.on_ground = packet.on_ground;
        }

        session.send_downstream_packet(java::ClientPacket::PlayerPositionRotation(
            java::PlayerPositionRotation {
                position: corrected,
                yaw: packet.rotation.yaw,
                pitch: packet.rotation.pitch,
                on_ground: packet.on_ground,
            },
        ));
        Ok(())
    }
}

/// Client pressed respawn on the death screen.
pub struct RespawnTranslator;

impl BedrockTranslator for RespawnTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::Respawn(packet) = packet else {
            return Ok(());
        };
        if packet.state != bedrock::RespawnState::ClientReady {
            return Ok(());
        }
        // Acknowledge first; the client stays on the death screen until
        // the server side reports ready. Before the spawn sequence there
        // is no position worth echoing.
        if session.lifecycle() >= Lifecycle::Spawned {
            let position = collision::to_frontend_position(session.player().position);
            session.send_upstream_packet(bedrock::Packet::Respawn(bedrock::Respawn {
                runtime_entity_id: PLAYER_RUNTIME_ID,
                position,
                state: bedrock::RespawnState::ServerReady,
            }));
        }
        session.send_downstream_packet(java::ClientPacket::ClientRequest(java::ClientRequest {
            request: java::Request::Respawn,
        }));
        Ok(())
    }
}

pub struct TextTranslator;

impl BedrockTranslator for TextTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::Text(packet) = packet else {
            return Ok(());
        };
        session.send_downstream_packet(java::ClientPacket::ChatMessage(java::ChatMessage {
            message: packet.message,
        }));
        Ok(())
    }
}

pub struct RequestChunkRadiusTranslator;

impl BedrockTranslator for RequestChunkRadiusTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::RequestChunkRadius(packet) = packet else {
            return Ok(());
        };
        let granted = session.set_render_distance(packet.radius);
        session.send_upstream_packet(bedrock::Packet::ChunkRadiusUpdated(
            bedrock::ChunkRadiusUpdated { radius: granted },
        ));
        Ok(())
    }
}

pub struct ContainerCloseTranslator;

impl BedrockTranslator for ContainerCloseTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::ContainerClose(packet) = packet else {
            return Ok(());
        };
        // The frontend requires a close echo even for windows the backend
        // never knew about.
        session.send_upstream_packet(bedrock::Packet::ContainerClose(bedrock::ContainerClose {
            window_id: packet.window_id,
        }));
        if packet.window_id == PLAYER_WINDOW_ID {
            return Ok(());
        }
        let was_open = session
            .inventory_cache()
            .map(|inventories| inventories.close_window(packet.window_id))
            .unwrap_or(false);
        if was_open {
            session.send_downstream_packet(java::ClientPacket::CloseWindow(java::CloseWindow {
                window_id: packet.window_id,
            }));
        } else {
            tracing::debug!(window_id = packet.window_id, "close for untracked window");
        }
        Ok(())
    }
}

pub struct SetLocalPlayerAsInitializedTranslator;

impl BedrockTranslator for SetLocalPlayerAsInitializedTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::SetLocalPlayerAsInitialized(packet) = packet else {
            return Ok(());
        };
        if packet.runtime_entity_id != PLAYER_RUNTIME_ID {
            tracing::debug!(
                id = packet.runtime_entity_id.as_u64(),
                "initialized packet for foreign runtime id"
            );
            return Ok(());
        }
        if session.mark_initialized() {
            tracing::info!(username = %session.player().username, "player initialized");
        }
        Ok(())
    }
}

pub struct PlayerActionTranslator;

impl BedrockTranslator for PlayerActionTranslator {
    fn translate(&self, session: &Arc<Session>, packet: bedrock::Packet) -> anyhow::Result<()> {
        let bedrock::Packet::PlayerAction(packet) = packet else {
            return Ok(());
        };
        match packet.action {
            bedrock::Action::DimensionChangeSuccess => {
                // Dimension switch handshake complete; release the client
                // from the loading screen. Only answered while a switch is
                // actually outstanding.
                if session.finish_dimension_switch() {
                    session.send_upstream_packet(bedrock::Packet::PlayStatus(
                        bedrock::PlayStatus {
                            status: bedrock::Status::PlayerSpawn,
                        },
                    ));
                } else {
                    tracing::debug!("dimension change success with no switch pending");
                }
            }
            other => {
                tracing::debug!(action = ?other, "unhandled player action");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{BlockState, ChunkColumn};
    use crate::position::{BlockPosition, Position, Rotation, Vec3f};
    use crate::testutil;

    fn move_packet(position: Vec3f, on_ground: bool) -> bedrock::Packet {
        bedrock::Packet::MovePlayer(bedrock::MovePlayer {
            runtime_entity_id: PLAYER_RUNTIME_ID,
            position,
            rotation: Rotation::new(90.0, 0.0),
            mode: bedrock::MoveMode::Normal,
            on_ground,
        })
    }

    #[test]
    fn movement_is_corrected_against_cached_geometry() {
        let (connector, _remote) = testutil::caching_connector();
        let (session, _upstream) = testutil::session_on(&connector);
        let backend = testutil::attach_backend(&session);

        let floor = BlockPosition::new(0, 63, 0);
        let mut column = ChunkColumn::new(floor.chunk());
        column.set_block(floor, BlockState(1));
        session.chunk_cache().unwrap().insert_column(column);

        // Feet at 63.7, clipping into the floor block.
        session.receive_upstream_packet(move_packet(Vec3f::new(0.5, 65.32, 0.5), true));

        let packets: Vec<_> = backend.drain().collect();
        assert_eq!(packets.len(), 1);
        let java::ClientPacket::PlayerPositionRotation(moved) = &packets[0] else {
            panic!("expected a movement packet");
        };
        assert!((moved.position.y - 64.0).abs() < 1e-9);
        assert_eq!(session.player().position, moved.position);
    }

    #[test]
    fn implausible_movement_resyncs_instead_of_forwarding() {
        let (_connector, session, upstream) = testutil::session();
        let backend = testutil::attach_backend(&session);

        session.receive_upstream_packet(move_packet(Vec3f::new(500.0, 70.0, 500.0), true));

        assert_eq!(backend.drain().count(), 0);
        let resync: Vec<_> = upstream.drain().collect();
        assert!(resync.iter().any(|packet| matches!(
            packet,
            bedrock::Packet::MovePlayer(m) if m.mode == bedrock::MoveMode::Reset
        )));
    }

    #[test]
    fn reaching_a_teleport_target_confirms_it() {
        let (_connector, session, _upstream) = testutil::session();
        let backend = testutil::attach_backend(&session);

        let target = Position::new(10.0, 64.0, 10.0);
        session.teleport_cache().unwrap().record(target, 77);
        session.player().position = target;

        session.receive_upstream_packet(move_packet(Vec3f::new(10.0, 65.62, 10.0), false));

        let packets: Vec<_> = backend.drain().collect();
        assert!(matches!(
            packets[0],
            java::ClientPacket::TeleportConfirm(java::TeleportConfirm { teleport_id: 77 })
        ));
        assert!(matches!(
            packets[1],
            java::ClientPacket::PlayerPositionRotation(_)
        ));
    }

    #[test]
    fn movement_away_from_a_pending_teleport_is_dropped() {
        let (_connector, session, _upstream) = testutil::session();
        let backend = testutil::attach_backend(&session);

        session
            .teleport_cache()
            .unwrap()
            .record(Position::new(100.0, 64.0, 100.0), 5);
        session.receive_upstream_packet(move_packet(Vec3f::new(1.0, 65.62, 1.0), false));

        assert_eq!(backend.drain().count(), 0);
        assert!(session.teleport_cache().unwrap().pending().is_some());
    }

    #[test]
    fn chat_is_forwarded_to_the_backend() {
        let (_connector, session, _upstream) = testutil::session();
        let backend = testutil::attach_backend(&session);
        session.receive_upstream_packet(bedrock::Packet::Text(bedrock::Text {
            source_name: "Steve".into(),
            message: "hello".into(),
            xuid: String::new(),
        }));
        let packets: Vec<_> = backend.drain().collect();
        assert!(matches!(
            &packets[0],
            java::ClientPacket::ChatMessage(m) if m.message == "hello"
        ));
    }

    #[test]
    fn chunk_radius_request_is_answered_with_the_granted_radius() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_upstream_packet(bedrock::Packet::RequestChunkRadius(
            bedrock::RequestChunkRadius { radius: 96 },
        ));
        let packets: Vec<_> = upstream.drain().collect();
        assert!(matches!(
            &packets[0],
            bedrock::Packet::ChunkRadiusUpdated(u)
                if u.radius == crate::config::MAX_RENDER_DISTANCE
        ));
    }

    #[test]
    fn dimension_change_success_without_a_pending_switch_is_ignored() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_upstream_packet(bedrock::Packet::PlayerAction(bedrock::PlayerAction {
            runtime_entity_id: PLAYER_RUNTIME_ID,
            action: bedrock::Action::DimensionChangeSuccess,
        }));
        assert_eq!(upstream.drain().count(), 0);
    }

    #[test]
    fn closing_the_player_inventory_is_echoed_but_not_forwarded() {
        let (_connector, session, upstream) = testutil::session();
        let backend = testutil::attach_backend(&session);
        session.receive_upstream_packet(bedrock::Packet::ContainerClose(
            bedrock::ContainerClose { window_id: PLAYER_WINDOW_ID },
        ));
        assert_eq!(upstream.drain().count(), 1);
        assert_eq!(backend.drain().count(), 0);
    }
}
