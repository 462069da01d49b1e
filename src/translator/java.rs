//! Built-in translators for packets received from the backend server.

use crate::{
    collision,
    entity::PLAYER_RUNTIME_ID,
    position::{Rotation, Vec3f},
    protocol::{bedrock, java},
    session::{Lifecycle, Session},
    translator::{JavaTranslator, TranslatorRegistry},
};
use std::sync::Arc;

pub(super) fn register_builtin(registry: &mut TranslatorRegistry) {
    use java::ServerPacketKind;
    registry.register_java(ServerPacketKind::LoginSuccess, 0, Box::new(LoginSuccessTranslator));
    registry.register_java(ServerPacketKind::JoinGame, 0, Box::new(JoinGameTranslator));
    registry.register_java(ServerPacketKind::Respawn, 0, Box::new(RespawnTranslator));
    registry.register_java(
        ServerPacketKind::PlayerPositionLook,
        0,
        Box::new(PlayerPositionLookTranslator),
    );
    registry.register_java(ServerPacketKind::SpawnEntity, 0, Box::new(SpawnEntityTranslator));
    registry.register_java(
        ServerPacketKind::EntityTeleport,
        0,
        Box::new(EntityTeleportTranslator),
    );
    registry.register_java(
        ServerPacketKind::DestroyEntities,
        0,
        Box::new(DestroyEntitiesTranslator),
    );
    registry.register_java(ServerPacketKind::ChunkData, 0, Box::new(ChunkDataTranslator));
    registry.register_java(ServerPacketKind::UnloadChunk, 0, Box::new(UnloadChunkTranslator));
    registry.register_java(ServerPacketKind::OpenWindow, 0, Box::new(OpenWindowTranslator));
    registry.register_java(ServerPacketKind::CloseWindow, 0, Box::new(CloseWindowTranslator));
    registry.register_java(
        ServerPacketKind::ScoreboardObjective,
        0,
        Box::new(ScoreboardObjectiveTranslator),
    );
    registry.register_java(ServerPacketKind::KeepAlive, 0, Box::new(KeepAliveTranslator));
    registry.register_java(ServerPacketKind::PluginMessage, 0, Box::new(PluginMessageTranslator));
    registry.register_java(ServerPacketKind::Disconnect, 0, Box::new(DisconnectTranslator));
}

pub struct LoginSuccessTranslator;

impl JavaTranslator for LoginSuccessTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::LoginSuccess(packet) = packet else {
            return Ok(());
        };
        {
            let mut player = session.player();
            player.uuid = packet.uuid;
            player.username = packet.username;
        }
        session.finish_login();
        session.send_upstream_packet(bedrock::Packet::PlayStatus(bedrock::PlayStatus {
            status: bedrock::Status::LoginSuccess,
        }));
        session.schedule_channel_replay();
        Ok(())
    }
}

/// First packet of the play state; drives the frontend's own spawn
/// sequence, including the static registry payloads it refuses to spawn
/// without.
pub struct JoinGameTranslator;

impl JavaTranslator for JoinGameTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::JoinGame(packet) = packet else {
            return Ok(());
        };
        let (position, rotation) = {
            let mut player = session.player();
            player.java_id = packet.entity_id;
            player.dimension = packet.dimension;
            player.gamemode = packet.gamemode;
            (
                collision::to_frontend_position(player.position),
                player.rotation,
            )
        };
        // The spawn handshake runs exactly once; a repeat JoinGame (server
        // transfer, world reload) only refreshes the shadow state above.
        if session.lifecycle() >= Lifecycle::Spawned {
            tracing::debug!("join after spawn, skipping the start sequence");
            return Ok(());
        }

        let level_name = session
            .config()
            .map(|config| config.level_name.clone())
            .unwrap_or_default();
        session.send_upstream_packet(bedrock::Packet::StartGame(bedrock::StartGame {
            unique_entity_id: PLAYER_RUNTIME_ID,
            runtime_entity_id: PLAYER_RUNTIME_ID,
            gamemode: packet.gamemode,
            position,
            rotation,
            dimension: packet.dimension,
            level_name,
        }));

        if let Some(connector) = session.connector() {
            let registries = connector.registries();
            session.send_upstream_packet(bedrock::Packet::BiomeDefinitionList(
                bedrock::BiomeDefinitionList {
                    definitions: registries.biome_definitions.clone(),
                },
            ));
            session.send_upstream_packet(bedrock::Packet::AvailableEntityIdentifiers(
                bedrock::AvailableEntityIdentifiers {
                    identifiers: registries.entity_identifiers.clone(),
                },
            ));
            session.send_upstream_packet(bedrock::Packet::CreativeContent(
                bedrock::CreativeContent {
                    contents: registries.creative_content.clone(),
                },
            ));
        }

        session.send_upstream_packet(bedrock::Packet::UpdateAttributes(
            bedrock::UpdateAttributes {
                runtime_entity_id: PLAYER_RUNTIME_ID,
                attributes: vec![
                    bedrock::Attribute {
                        id: String::from("minecraft:health"),
                        minimum: 0.0,
                        maximum: 20.0,
                        value: 20.0,
                        default_value: 20.0,
                    },
                    // Baseline walk speed; without it the client spawns
                    // frozen in place.
                    bedrock::Attribute {
                        id: String::from("minecraft:movement"),
                        minimum: 0.0,
                        maximum: 1024.0,
                        value: 0.1,
                        default_value: 0.1,
                    },
                ],
            },
        ));
        session.send_upstream_packet(bedrock::Packet::PlayStatus(bedrock::PlayStatus {
            status: bedrock::Status::PlayerSpawn,
        }));
        session.mark_spawned();
        Ok(())
    }
}

/// Backend dimension switch (or post-death respawn). Per-dimension state
/// is dropped and the frontend is walked through its own dimension
/// change handshake.
pub struct RespawnTranslator;

impl JavaTranslator for RespawnTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::Respawn(packet) = packet else {
            return Ok(());
        };
        let (switching, position) = {
            let mut player = session.player();
            let switching = player.dimension != packet.dimension;
            player.dimension = packet.dimension;
            player.gamemode = packet.gamemode;
            (switching, collision::to_frontend_position(player.position))
        };
        if !switching {
            return Ok(());
        }

        if let Some(entities) = session.entity_cache() {
            for runtime_id in entities.clear() {
                session.send_upstream_packet(bedrock::Packet::RemoveEntity(
                    bedrock::RemoveEntity { runtime_entity_id: runtime_id },
                ));
            }
        }
        if let Some(chunks) = session.chunk_cache() {
            chunks.clear();
        }
        if let Some(teleports) = session.teleport_cache() {
            teleports.clear();
        }
        if let Some(scoreboards) = session.scoreboard_cache() {
            for objective in scoreboards.clear() {
                session.send_upstream_packet(bedrock::Packet::RemoveObjective(
                    bedrock::RemoveObjective {
                        objective: objective.name,
                    },
                ));
            }
        }

        session.begin_dimension_switch();
        session.send_upstream_packet(bedrock::Packet::ChangeDimension(bedrock::ChangeDimension {
            dimension: packet.dimension,
            position,
            respawn: true,
        }));
        // The client answers with a DimensionChangeSuccess action once its
        // loading screen is done.
        Ok(())
    }
}

pub struct PlayerPositionLookTranslator;

impl JavaTranslator for PlayerPositionLookTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::PlayerPositionLook(packet) = packet else {
            return Ok(());
        };
        if let Some(teleports) = session.teleport_cache() {
            teleports.record(packet.position, packet.teleport_id);
        }
        let on_ground = {
            let mut player = session.player();
            player.position = packet.position;
            player.rotation = Rotation::new(packet.yaw, packet.pitch);
            player.on_ground
        };
        session.send_upstream_packet(bedrock::Packet::MovePlayer(bedrock::MovePlayer {
            runtime_entity_id: PLAYER_RUNTIME_ID,
            position: collision::to_frontend_position(packet.position),
            rotation: Rotation::new(packet.yaw, packet.pitch),
            mode: bedrock::MoveMode::Teleport,
            on_ground,
        }));
        Ok(())
    }
}

pub struct SpawnEntityTranslator;

impl JavaTranslator for SpawnEntityTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::SpawnEntity(packet) = packet else {
            return Ok(());
        };
        let Some(entities) = session.entity_cache() else {
            return Ok(());
        };
        let runtime_id = entities.register(packet.entity_id);
        session.send_upstream_packet(bedrock::Packet::AddEntity(bedrock::AddEntity {
            runtime_entity_id: runtime_id,
            identifier: packet.identifier,
            position: Vec3f::from(packet.position),
            rotation: Rotation::new(packet.yaw, packet.pitch),
        }));
        Ok(())
    }
}

pub struct EntityTeleportTranslator;

impl JavaTranslator for EntityTeleportTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::EntityTeleport(packet) = packet else {
            return Ok(());
        };
        let Some(entities) = session.entity_cache() else {
            return Ok(());
        };
        let Some(runtime_id) = entities.runtime_id(packet.entity_id) else {
            tracing::debug!(id = packet.entity_id.as_i32(), "movement for untracked entity");
            return Ok(());
        };
        session.send_upstream_packet(bedrock::Packet::MoveEntityAbsolute(
            bedrock::MoveEntityAbsolute {
                runtime_entity_id: runtime_id,
                position: Vec3f::from(packet.position),
                rotation: Rotation::new(packet.yaw, packet.pitch),
                teleported: true,
                on_ground: packet.on_ground,
            },
        ));
        Ok(())
    }
}

pub struct DestroyEntitiesTranslator;

impl JavaTranslator for DestroyEntitiesTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::DestroyEntities(packet) = packet else {
            return Ok(());
        };
        let Some(entities) = session.entity_cache() else {
            return Ok(());
        };
        for java_id in packet.entity_ids {
            match entities.remove(java_id) {
                Some(runtime_id) => {
                    session.send_upstream_packet(bedrock::Packet::RemoveEntity(
                        bedrock::RemoveEntity { runtime_entity_id: runtime_id },
                    ));
                }
                None => tracing::debug!(id = java_id.as_i32(), "destroy for untracked entity"),
            }
        }
        Ok(())
    }
}

/// Feeds the chunk cache. Block payload conversion for the frontend is
/// the platform codec's job; movement correction only needs the column
/// retained here.
pub struct ChunkDataTranslator;

impl JavaTranslator for ChunkDataTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::ChunkData(packet) = packet else {
            return Ok(());
        };
        if let Some(chunks) = session.chunk_cache() {
            chunks.insert_column(packet.column);
        }
        Ok(())
    }
}

pub struct UnloadChunkTranslator;

impl JavaTranslator for UnloadChunkTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::UnloadChunk(packet) = packet else {
            return Ok(());
        };
        if let Some(chunks) = session.chunk_cache() {
            chunks.remove_column(packet.position);
        }
        Ok(())
    }
}

fn container_type_for(kind: &str) -> i8 {
    match kind {
        "minecraft:crafting" => 1,
        "minecraft:furnace" | "minecraft:blast_furnace" | "minecraft:smoker" => 2,
        "minecraft:enchantment" => 3,
        "minecraft:brewing_stand" => 4,
        "minecraft:anvil" => 5,
        // Generic chest UI fits everything else well enough.
        _ => 0,
    }
}

pub struct OpenWindowTranslator;

impl JavaTranslator for OpenWindowTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::OpenWindow(packet) = packet else {
            return Ok(());
        };
        let Some(inventories) = session.inventory_cache() else {
            return Ok(());
        };
        inventories.open_window(packet.window_id, packet.kind.clone(), packet.title);
        // The frontend anchors container UIs to a block; the player's own
        // feet are the only position that is always valid.
        let position = session.player().position.block();
        session.send_upstream_packet(bedrock::Packet::ContainerOpen(bedrock::ContainerOpen {
            window_id: packet.window_id,
            container_type: container_type_for(&packet.kind),
            position,
        }));
        Ok(())
    }
}

pub struct CloseWindowTranslator;

impl JavaTranslator for CloseWindowTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::CloseWindow(packet) = packet else {
            return Ok(());
        };
        let was_open = session
            .inventory_cache()
            .map(|inventories| inventories.close_window(packet.window_id))
            .unwrap_or(false);
        if was_open {
            session.send_upstream_packet(bedrock::Packet::ContainerClose(bedrock::ContainerClose {
                window_id: packet.window_id,
            }));
        }
        Ok(())
    }
}

pub struct ScoreboardObjectiveTranslator;

impl JavaTranslator for ScoreboardObjectiveTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::ScoreboardObjective(packet) = packet else {
            return Ok(());
        };
        let Some(scoreboards) = session.scoreboard_cache() else {
            return Ok(());
        };
        match packet.action {
            java::ObjectiveAction::Add | java::ObjectiveAction::Update => {
                scoreboards.register(packet.name.clone(), packet.display_name.clone());
                session.send_upstream_packet(bedrock::Packet::SetDisplayObjective(
                    bedrock::SetDisplayObjective {
                        display_slot: String::from("sidebar"),
                        objective: packet.name,
                        display_name: packet.display_name,
                    },
                ));
            }
            java::ObjectiveAction::Remove => {
                if scoreboards.remove(&packet.name).is_some() {
                    session.send_upstream_packet(bedrock::Packet::RemoveObjective(
                        bedrock::RemoveObjective {
                            objective: packet.name,
                        },
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Answered here so sessions survive even when the embedder never polls.
pub struct KeepAliveTranslator;

impl JavaTranslator for KeepAliveTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::KeepAlive(packet) = packet else {
            return Ok(());
        };
        session.send_downstream_packet(java::ClientPacket::KeepAlive(java::KeepAlive {
            id: packet.id,
        }));
        Ok(())
    }
}

pub struct PluginMessageTranslator;

impl JavaTranslator for PluginMessageTranslator {
    fn translate(&self, _session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::PluginMessage(packet) = packet else {
            return Ok(());
        };
        // No frontend equivalent; consumed here so it does not show up as
        // an unhandled kind on every custom-payload-heavy server.
        tracing::debug!(channel = %packet.channel, len = packet.data.len(), "plugin message");
        Ok(())
    }
}

pub struct DisconnectTranslator;

impl JavaTranslator for DisconnectTranslator {
    fn translate(&self, session: &Arc<Session>, packet: java::ServerPacket) -> anyhow::Result<()> {
        let java::ServerPacket::Disconnect(packet) = packet else {
            return Ok(());
        };
        tracing::info!(reason = %packet.reason, "backend closed the session");
        session.disconnect(packet.reason);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GameMode, JavaEntityId};
    use crate::position::Position;
    use crate::session::Lifecycle;
    use crate::testutil;

    #[test]
    fn consecutive_respawns_coalesce_into_one_dimension_change() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::Respawn(java::Respawn {
            dimension: 1,
            gamemode: GameMode::Survival,
        }));
        session.receive_downstream_packet(java::ServerPacket::Respawn(java::Respawn {
            dimension: -1,
            gamemode: GameMode::Survival,
        }));
        // Nothing reaches the client until a non-respawn packet flushes
        // the parked switch.
        assert_eq!(upstream.drain().count(), 0);

        session.receive_downstream_packet(java::ServerPacket::KeepAlive(java::KeepAlive {
            id: 1,
        }));
        let changes: Vec<_> = upstream
            .drain()
            .filter(|packet| matches!(packet, bedrock::Packet::ChangeDimension(_)))
            .collect();
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            &changes[0],
            bedrock::Packet::ChangeDimension(c) if c.dimension == -1
        ));
        assert_eq!(session.player().dimension, -1);
    }

    #[test]
    fn dimension_switch_drops_per_dimension_state() {
        let (_connector, session, upstream) = testutil::session();
        let entities = session.entity_cache().unwrap();
        let runtime_id = entities.register(JavaEntityId::new(40));
        session
            .scoreboard_cache()
            .unwrap()
            .register("health".into(), "HP".into());
        session
            .teleport_cache()
            .unwrap()
            .record(Position::new(0.0, 0.0, 0.0), 5);

        session.receive_downstream_packet(java::ServerPacket::Respawn(java::Respawn {
            dimension: 1,
            gamemode: GameMode::Survival,
        }));
        session.receive_downstream_packet(java::ServerPacket::KeepAlive(java::KeepAlive {
            id: 2,
        }));

        assert_eq!(entities.tracked_count(), 0);
        assert!(session.teleport_cache().unwrap().pending().is_none());
        let packets: Vec<_> = upstream.drain().collect();
        assert!(packets.iter().any(|packet| matches!(
            packet,
            bedrock::Packet::RemoveEntity(r) if r.runtime_entity_id == runtime_id
        )));
        assert!(packets.iter().any(|packet| matches!(
            packet,
            bedrock::Packet::RemoveObjective(o) if o.objective == "health"
        )));
    }

    #[test]
    fn join_game_runs_the_spawn_sequence() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::JoinGame(java::JoinGame {
            entity_id: JavaEntityId::new(12),
            gamemode: GameMode::Creative,
            dimension: 0,
        }));

        let packets: Vec<_> = upstream.drain().collect();
        assert!(matches!(
            &packets[0],
            bedrock::Packet::StartGame(s)
                if s.gamemode == GameMode::Creative
                    && s.runtime_entity_id == PLAYER_RUNTIME_ID
        ));
        assert!(matches!(
            packets.last(),
            Some(bedrock::Packet::PlayStatus(p)) if p.status == bedrock::Status::PlayerSpawn
        ));
        assert_eq!(session.lifecycle(), Lifecycle::Spawned);
        assert_eq!(session.player().java_id, JavaEntityId::new(12));
    }

    #[test]
    fn repeat_join_game_does_not_replay_the_spawn_sequence() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::JoinGame(java::JoinGame {
            entity_id: JavaEntityId::new(12),
            gamemode: GameMode::Survival,
            dimension: 0,
        }));
        assert_eq!(session.lifecycle(), Lifecycle::Spawned);
        upstream.drain().count();

        // A server transfer resends JoinGame; the spawned client must not
        // see the start handshake again.
        session.receive_downstream_packet(java::ServerPacket::JoinGame(java::JoinGame {
            entity_id: JavaEntityId::new(30),
            gamemode: GameMode::Creative,
            dimension: 0,
        }));
        assert_eq!(upstream.drain().count(), 0);
        // The shadow state still tracks the new backend identity.
        assert_eq!(session.player().java_id, JavaEntityId::new(30));
        assert_eq!(session.player().gamemode, GameMode::Creative);
    }

    #[test]
    fn dimension_switch_is_released_exactly_once() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::Respawn(java::Respawn {
            dimension: 1,
            gamemode: GameMode::Survival,
        }));
        session.receive_downstream_packet(java::ServerPacket::KeepAlive(java::KeepAlive {
            id: 3,
        }));
        upstream.drain().count();

        let success = bedrock::Packet::PlayerAction(bedrock::PlayerAction {
            runtime_entity_id: PLAYER_RUNTIME_ID,
            action: bedrock::Action::DimensionChangeSuccess,
        });
        session.receive_upstream_packet(success.clone());
        let packets: Vec<_> = upstream.drain().collect();
        assert_eq!(packets.len(), 1);
        assert!(matches!(
            &packets[0],
            bedrock::Packet::PlayStatus(p) if p.status == bedrock::Status::PlayerSpawn
        ));

        // The switch was consumed; a stray second report changes nothing.
        session.receive_upstream_packet(success);
        assert_eq!(upstream.drain().count(), 0);
    }

    #[test]
    fn entity_movement_follows_the_runtime_id_mapping() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::SpawnEntity(java::SpawnEntity {
            entity_id: JavaEntityId::new(55),
            identifier: "minecraft:zombie".into(),
            position: Position::new(4.0, 64.0, 4.0),
            yaw: 0.0,
            pitch: 0.0,
        }));
        upstream.drain().count();
        let runtime_id = session
            .entity_cache()
            .unwrap()
            .runtime_id(JavaEntityId::new(55))
            .unwrap();

        session.receive_downstream_packet(java::ServerPacket::EntityTeleport(
            java::EntityTeleport {
                entity_id: JavaEntityId::new(55),
                position: Position::new(6.0, 65.0, 4.0),
                yaw: 90.0,
                pitch: 0.0,
                on_ground: true,
            },
        ));
        let packets: Vec<_> = upstream.drain().collect();
        assert!(matches!(
            &packets[0],
            bedrock::Packet::MoveEntityAbsolute(m)
                if m.runtime_entity_id == runtime_id && m.position.x == 6.0
        ));

        // Movement for an entity never spawned is dropped.
        session.receive_downstream_packet(java::ServerPacket::EntityTeleport(
            java::EntityTeleport {
                entity_id: JavaEntityId::new(99),
                position: Position::new(0.0, 64.0, 0.0),
                yaw: 0.0,
                pitch: 0.0,
                on_ground: true,
            },
        ));
        assert_eq!(upstream.drain().count(), 0);
    }

    #[test]
    fn keep_alive_is_reflected_to_the_backend() {
        let (_connector, session, _upstream) = testutil::session();
        let backend = testutil::attach_backend(&session);
        session.receive_downstream_packet(java::ServerPacket::KeepAlive(java::KeepAlive {
            id: 99,
        }));
        let packets: Vec<_> = backend.drain().collect();
        assert!(matches!(
            packets[0],
            java::ClientPacket::KeepAlive(java::KeepAlive { id: 99 })
        ));
    }

    #[test]
    fn backend_teleport_is_recorded_and_mirrored() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::PlayerPositionLook(
            java::PlayerPositionLook {
                position: Position::new(50.0, 70.0, -20.0),
                yaw: 45.0,
                pitch: 10.0,
                teleport_id: 9,
            },
        ));

        let pending = session.teleport_cache().unwrap().pending().unwrap();
        assert_eq!(pending.teleport_id, 9);
        let packets: Vec<_> = upstream.drain().collect();
        assert!(matches!(
            &packets[0],
            bedrock::Packet::MovePlayer(m)
                if m.mode == bedrock::MoveMode::Teleport
                    && m.runtime_entity_id == PLAYER_RUNTIME_ID
        ));
        assert_eq!(session.player().position, Position::new(50.0, 70.0, -20.0));
    }

    #[test]
    fn spawned_entities_map_to_fresh_runtime_ids() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::SpawnEntity(java::SpawnEntity {
            entity_id: JavaEntityId::new(55),
            identifier: "minecraft:zombie".into(),
            position: Position::new(4.0, 64.0, 4.0),
            yaw: 0.0,
            pitch: 0.0,
        }));
        session.receive_downstream_packet(java::ServerPacket::DestroyEntities(
            java::DestroyEntities {
                entity_ids: vec![JavaEntityId::new(55)],
            },
        ));

        let packets: Vec<_> = upstream.drain().collect();
        let added = packets
            .iter()
            .find_map(|packet| match packet {
                bedrock::Packet::AddEntity(a) => Some(a.runtime_entity_id),
                _ => None,
            })
            .unwrap();
        assert!(packets.iter().any(|packet| matches!(
            packet,
            bedrock::Packet::RemoveEntity(r) if r.runtime_entity_id == added
        )));
        assert_eq!(session.entity_cache().unwrap().tracked_count(), 0);
    }

    #[test]
    fn scoreboard_objectives_roundtrip_to_display_packets() {
        let (_connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::ScoreboardObjective(
            java::ScoreboardObjective {
                name: "kills".into(),
                action: java::ObjectiveAction::Add,
                display_name: "Kills".into(),
            },
        ));
        session.receive_downstream_packet(java::ServerPacket::ScoreboardObjective(
            java::ScoreboardObjective {
                name: "kills".into(),
                action: java::ObjectiveAction::Remove,
                display_name: String::new(),
            },
        ));

        let packets: Vec<_> = upstream.drain().collect();
        assert!(matches!(
            &packets[0],
            bedrock::Packet::SetDisplayObjective(s) if s.objective == "kills"
        ));
        assert!(matches!(
            &packets[1],
            bedrock::Packet::RemoveObjective(r) if r.objective == "kills"
        ));
    }

    #[test]
    fn backend_disconnect_closes_the_session() {
        let (connector, session, upstream) = testutil::session();
        session.receive_downstream_packet(java::ServerPacket::Disconnect(java::Disconnect {
            reason: "kicked".into(),
        }));
        assert!(session.is_closed());
        assert_eq!(connector.session_count(), 0);
        let packets: Vec<_> = upstream.drain().collect();
        assert!(matches!(
            &packets[0],
            bedrock::Packet::Disconnect(d) if d.kick_message == "kicked"
        ));
    }
}
