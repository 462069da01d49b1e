//! Frontend (Bedrock) packet values.
//!
//! Bedrock uses a single packet namespace for both directions, so one
//! enum covers packets received from and sent to the client.

use crate::{
    entity::{EntityMetadata, GameMode, RuntimeEntityId},
    position::{BlockPosition, Rotation, Vec3f},
    protocol::RegistryBlob,
};
use strum::EnumDiscriminants;

#[derive(Debug, Clone, PartialEq, EnumDiscriminants, strum::AsRefStr)]
#[strum_discriminants(name(PacketKind), derive(Hash))]
pub enum Packet {
    PlayStatus(PlayStatus),
    StartGame(StartGame),
    BiomeDefinitionList(BiomeDefinitionList),
    AvailableEntityIdentifiers(AvailableEntityIdentifiers),
    CreativeContent(CreativeContent),
    UpdateAttributes(UpdateAttributes),
    MovePlayer(MovePlayer),
    MoveEntityAbsolute(MoveEntityAbsolute),
    SetEntityData(SetEntityData),
    AddEntity(AddEntity),
    RemoveEntity(RemoveEntity),
    Text(Text),
    Respawn(Respawn),
    ChangeDimension(ChangeDimension),
    SetLocalPlayerAsInitialized(SetLocalPlayerAsInitialized),
    PlayerAction(PlayerAction),
    RequestChunkRadius(RequestChunkRadius),
    ChunkRadiusUpdated(ChunkRadiusUpdated),
    ContainerOpen(ContainerOpen),
    ContainerClose(ContainerClose),
    SetDisplayObjective(SetDisplayObjective),
    RemoveObjective(RemoveObjective),
    Disconnect(Disconnect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayStatus {
    pub status: Status,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    LoginSuccess,
    PlayerSpawn,
}

/// Initial world handshake. Only the fields the frontend refuses to spawn
/// without; everything else is emitted with fixed defaults by the codec.
#[derive(Debug, Clone, PartialEq)]
pub struct StartGame {
    pub unique_entity_id: RuntimeEntityId,
    pub runtime_entity_id: RuntimeEntityId,
    pub gamemode: GameMode,
    pub position: Vec3f,
    pub rotation: Rotation,
    pub dimension: i32,
    pub level_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiomeDefinitionList {
    pub definitions: RegistryBlob,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailableEntityIdentifiers {
    pub identifiers: RegistryBlob,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreativeContent {
    pub contents: RegistryBlob,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: String,
    pub minimum: f32,
    pub maximum: f32,
    pub value: f32,
    pub default_value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttributes {
    pub runtime_entity_id: RuntimeEntityId,
    pub attributes: Vec<Attribute>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveMode {
    Normal,
    Reset,
    Teleport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovePlayer {
    pub runtime_entity_id: RuntimeEntityId,
    pub position: Vec3f,
    pub rotation: Rotation,
    pub mode: MoveMode,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntityAbsolute {
    pub runtime_entity_id: RuntimeEntityId,
    pub position: Vec3f,
    pub rotation: Rotation,
    pub teleported: bool,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityData {
    pub runtime_entity_id: RuntimeEntityId,
    pub metadata: EntityMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddEntity {
    pub runtime_entity_id: RuntimeEntityId,
    pub identifier: String,
    pub position: Vec3f,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveEntity {
    pub runtime_entity_id: RuntimeEntityId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub source_name: String,
    pub message: String,
    pub xuid: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RespawnState {
    ClientReady,
    ServerSearching,
    ServerReady,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Respawn {
    pub runtime_entity_id: RuntimeEntityId,
    pub position: Vec3f,
    pub state: RespawnState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDimension {
    pub dimension: i32,
    pub position: Vec3f,
    pub respawn: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetLocalPlayerAsInitialized {
    pub runtime_entity_id: RuntimeEntityId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    DimensionChangeSuccess,
    Jump,
    StartSneak,
    StopSneak,
    StartSprint,
    StopSprint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAction {
    pub runtime_entity_id: RuntimeEntityId,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestChunkRadius {
    pub radius: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRadiusUpdated {
    pub radius: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerOpen {
    pub window_id: u8,
    pub container_type: i8,
    pub position: BlockPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerClose {
    pub window_id: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetDisplayObjective {
    pub display_slot: String,
    pub objective: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveObjective {
    pub objective: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disconnect {
    pub hide_screen: bool,
    pub kick_message: String,
}
