//! Backend (Java) packet values, split by direction as the protocol is.
//!
//! [`ServerPacket`] is what the remote server sends us; [`ClientPacket`]
//! is what we send on the player's behalf.

use crate::{
    cache::ChunkColumn,
    entity::{GameMode, JavaEntityId},
    position::{ChunkPosition, Position},
};
use strum::EnumDiscriminants;

#[derive(Debug, Clone, PartialEq, EnumDiscriminants, strum::AsRefStr)]
#[strum_discriminants(name(ServerPacketKind), derive(Hash))]
pub enum ServerPacket {
    LoginSuccess(LoginSuccess),
    JoinGame(JoinGame),
    Respawn(Respawn),
    PlayerPositionLook(PlayerPositionLook),
    SpawnEntity(SpawnEntity),
    EntityTeleport(EntityTeleport),
    DestroyEntities(DestroyEntities),
    ChunkData(ChunkData),
    UnloadChunk(UnloadChunk),
    OpenWindow(OpenWindow),
    CloseWindow(CloseWindow),
    ScoreboardObjective(ScoreboardObjective),
    KeepAlive(KeepAlive),
    PluginMessage(PluginMessage),
    Disconnect(Disconnect),
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants, strum::AsRefStr)]
#[strum_discriminants(name(ClientPacketKind), derive(Hash))]
pub enum ClientPacket {
    Handshake(Handshake),
    ChatMessage(ChatMessage),
    PlayerPositionRotation(PlayerPositionRotation),
    TeleportConfirm(TeleportConfirm),
    ClientRequest(ClientRequest),
    CloseWindow(CloseWindow),
    KeepAlive(KeepAlive),
    PluginMessage(PluginMessage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub uuid: u128,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinGame {
    pub entity_id: JavaEntityId,
    pub gamemode: GameMode,
    pub dimension: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Respawn {
    pub dimension: i32,
    pub gamemode: GameMode,
}

/// Backend-initiated teleport; must be confirmed by id before further
/// client movement is trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionLook {
    pub position: Position,
    pub yaw: f32,
    pub pitch: f32,
    pub teleport_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntity {
    pub entity_id: JavaEntityId,
    pub identifier: String,
    pub position: Position,
    pub yaw: f32,
    pub pitch: f32,
}

/// Absolute position update for a tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTeleport {
    pub entity_id: JavaEntityId,
    pub position: Position,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestroyEntities {
    pub entity_ids: Vec<JavaEntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkData {
    pub column: ChunkColumn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnloadChunk {
    pub position: ChunkPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenWindow {
    pub window_id: u8,
    pub kind: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseWindow {
    pub window_id: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectiveAction {
    Add,
    Remove,
    Update,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardObjective {
    pub name: String,
    pub action: ObjectiveAction,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeepAlive {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluginMessage {
    pub channel: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disconnect {
    pub reason: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NextState {
    Status,
    Login,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub hostname: String,
    pub port: u16,
    pub next_state: NextState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionRotation {
    pub position: Position,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleportConfirm {
    pub teleport_id: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Respawn,
    Stats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientRequest {
    pub request: Request,
}
