//! One frontend player bridged to one backend connection.
//!
//! A session is shared between two contexts: the frontend I/O context
//! feeds [`Session::receive_upstream_packet`] and the backend I/O context
//! feeds [`Session::receive_downstream_packet`]. Nothing here assumes a
//! single thread; shared state sits behind its own lock and the send
//! handles are lock-free channels.

use crate::{
    auth::{self, AuthData, ClientData},
    cache::{
        ChunkCache, EntityCache, InventoryCache, ScoreboardCache, SessionCaches, TeleportCache,
    },
    collision,
    connection::{DownstreamConnection, UpstreamConnection},
    connector::Connector,
    entity::{PlayerEntity, PLAYER_RUNTIME_ID},
    protocol::{bedrock, java, BEDROCK_PROTOCOL_VERSION, JAVA_PROTOCOL_VERSION},
};
use anyhow::Context;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering},
        Arc, Mutex, MutexGuard, Weak,
    },
    time::Duration,
};
use thiserror::Error;

/// Channel registrations are replayed to a fresh backend connection
/// shortly after login, once the server has finished its own join
/// bookkeeping.
const CHANNEL_REPLAY_DELAY: Duration = Duration::from_secs(1);

/// Coarse session progress. Ordered: a later stage implies every earlier
/// one completed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    /// Frontend connection accepted, no backend activity yet.
    Connecting,
    /// Backend connection being opened.
    Authenticating,
    /// Backend login completed; spawn sequence under way.
    Initializing,
    /// The frontend spawn sequence has been sent.
    Spawned,
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is already authenticating")]
    AlreadyAuthenticated,
    #[error("authentication rejected")]
    AuthenticationRejected,
    #[error("session is closed")]
    Closed,
}

pub struct Session {
    connector: Weak<Connector>,
    address: String,
    upstream: UpstreamConnection,
    downstream: Mutex<Option<DownstreamConnection>>,
    caches: Mutex<Option<SessionCaches>>,
    player: Mutex<PlayerEntity>,
    auth_data: Mutex<Option<AuthData>>,
    client_data: Mutex<Option<ClientData>>,
    lifecycle: Mutex<Lifecycle>,
    deferred_respawn: Mutex<Option<java::Respawn>>,
    closed: AtomicBool,
    authenticating: AtomicBool,
    initialized: AtomicBool,
    render_distance: AtomicI32,
    pending_dimension_switches: AtomicU32,
}

impl Session {
    pub(crate) fn new(
        connector: Weak<Connector>,
        upstream: UpstreamConnection,
        address: String,
        cache_chunks: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            connector,
            address,
            upstream,
            downstream: Mutex::new(None),
            caches: Mutex::new(Some(SessionCaches::new(cache_chunks))),
            player: Mutex::new(PlayerEntity::new()),
            auth_data: Mutex::new(None),
            client_data: Mutex::new(None),
            lifecycle: Mutex::new(Lifecycle::Connecting),
            deferred_respawn: Mutex::new(None),
            closed: AtomicBool::new(false),
            authenticating: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            render_distance: AtomicI32::new(0),
            pending_dimension_switches: AtomicU32::new(0),
        })
    }

    pub fn connector(&self) -> Option<Arc<Connector>> {
        self.connector.upgrade()
    }

    pub fn config(&self) -> Option<Arc<crate::config::ProxyConfig>> {
        Some(self.connector.upgrade()?.config())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().expect("session lifecycle poisoned")
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn player(&self) -> MutexGuard<'_, PlayerEntity> {
        self.player.lock().expect("player state poisoned")
    }

    pub fn auth_data(&self) -> Option<AuthData> {
        self.auth_data.lock().expect("auth data poisoned").clone()
    }

    pub fn entity_cache(&self) -> Option<Arc<EntityCache>> {
        let caches = self.caches.lock().expect("session caches poisoned");
        caches.as_ref().map(|caches| Arc::clone(&caches.entity))
    }

    pub fn chunk_cache(&self) -> Option<Arc<ChunkCache>> {
        let caches = self.caches.lock().expect("session caches poisoned");
        caches.as_ref().map(|caches| Arc::clone(&caches.chunk))
    }

    pub fn inventory_cache(&self) -> Option<Arc<InventoryCache>> {
        let caches = self.caches.lock().expect("session caches poisoned");
        caches.as_ref().map(|caches| Arc::clone(&caches.inventory))
    }

    pub fn teleport_cache(&self) -> Option<Arc<TeleportCache>> {
        let caches = self.caches.lock().expect("session caches poisoned");
        caches.as_ref().map(|caches| Arc::clone(&caches.teleport))
    }

    pub fn scoreboard_cache(&self) -> Option<Arc<ScoreboardCache>> {
        let caches = self.caches.lock().expect("session caches poisoned");
        caches.as_ref().map(|caches| Arc::clone(&caches.scoreboard))
    }

    /// Begins the backend login. Runs on its own task so the frontend
    /// context is never blocked on a dial; failures tear the session down
    /// with a message on the disconnect screen.
    pub fn authenticate(
        self: &Arc<Self>,
        auth_data: AuthData,
        client_data: ClientData,
    ) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        if let Some(connector) = self.connector() {
            if !connector.check_auth(self, &auth_data) {
                return Err(SessionError::AuthenticationRejected);
            }
        }
        if self.authenticating.swap(true, Ordering::AcqRel) {
            return Err(SessionError::AlreadyAuthenticated);
        }
        {
            let mut player = self.player();
            player.username = auth_data.name.clone();
        }
        *self.auth_data.lock().expect("auth data poisoned") = Some(auth_data);
        *self.client_data.lock().expect("client data poisoned") = Some(client_data);
        *self.lifecycle.lock().expect("session lifecycle poisoned") = Lifecycle::Authenticating;

        let session = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(error) = Arc::clone(&session).login().await {
                tracing::error!(%error, address = %session.address, "backend login failed");
                session.disconnect(format!("Unable to connect to world: {error}"));
            }
        });
        Ok(())
    }

    async fn login(self: Arc<Self>) -> anyhow::Result<()> {
        let connector = self.connector().context("connector dropped during login")?;
        let config = connector.config();
        let handshake = java::Handshake {
            protocol_version: JAVA_PROTOCOL_VERSION,
            hostname: self.handshake_hostname(&connector),
            port: config.remote_port,
            next_state: java::NextState::Login,
        };
        let credentials = match config.auth_mode {
            auth::AuthMode::Online => config.credentials.clone(),
            _ => None,
        };
        let downstream = connector.remote().open(handshake, credentials).await?;
        if self.is_closed() {
            downstream.close();
            return Ok(());
        }
        self.attach_downstream(downstream);
        tracing::debug!(address = %self.address, "backend connection open");
        Ok(())
    }

    pub(crate) fn attach_downstream(&self, downstream: DownstreamConnection) {
        *self.downstream.lock().expect("downstream handle poisoned") = Some(downstream);
    }

    /// The hostname for the backend handshake. In bridged mode the
    /// sealed identity rides along; any key or seal failure degrades to
    /// the plain hostname so the player is not locked out by proxy-side
    /// misconfiguration.
    fn handshake_hostname(&self, connector: &Connector) -> String {
        let config = connector.config();
        let plain = config.remote_address.clone();
        if config.auth_mode != auth::AuthMode::Bridged {
            return plain;
        }
        let Some(provider) = connector.key_provider() else {
            tracing::warn!("bridged auth enabled but no key provider configured");
            return plain;
        };
        let key = match provider.load_key() {
            Ok(key) => key,
            Err(error) => {
                tracing::warn!(%error, "identity key unavailable, falling back to plain login");
                return plain;
            }
        };
        let auth_data = self.auth_data().unwrap_or(AuthData {
            name: String::new(),
            xuid: String::new(),
        });
        let client_data = self
            .client_data
            .lock()
            .expect("client data poisoned")
            .clone()
            .unwrap_or_default();
        // The verifier cares about the frontend player, so the sealed
        // payload carries the Bedrock protocol version.
        let payload = auth::IdentityPayload {
            protocol_version: BEDROCK_PROTOCOL_VERSION,
            username: auth_data.name,
            xuid: auth_data.xuid,
            device_os: client_data.device_os,
            language: client_data.language,
            input_mode: client_data.input_mode,
            address: self.address.clone(),
        };
        match auth::seal_identity(&key, &payload) {
            Ok(sealed) => auth::bridged_hostname(&plain, &sealed),
            Err(error) => {
                tracing::warn!(%error, "could not seal identity, falling back to plain login");
                plain
            }
        }
    }

    pub(crate) fn finish_login(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("session lifecycle poisoned");
        if *lifecycle < Lifecycle::Initializing {
            *lifecycle = Lifecycle::Initializing;
            tracing::info!(
                username = %self.player().username,
                address = %self.address,
                "logged in to the backend"
            );
        }
    }

    pub(crate) fn mark_spawned(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("session lifecycle poisoned");
        if *lifecycle < Lifecycle::Spawned {
            *lifecycle = Lifecycle::Spawned;
        }
    }

    /// First call returns `true`; later calls are no-ops.
    pub(crate) fn mark_initialized(&self) -> bool {
        !self.initialized.swap(true, Ordering::AcqRel)
    }

    /// Records a dimension switch the client still has to acknowledge.
    pub(crate) fn begin_dimension_switch(&self) {
        self.pending_dimension_switches.fetch_add(1, Ordering::AcqRel);
    }

    /// Consumes one outstanding switch. `false` means the client reported
    /// a change no switch was pending for.
    pub(crate) fn finish_dimension_switch(&self) -> bool {
        self.pending_dimension_switches
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            })
            .is_ok()
    }

    /// Queues a packet to the frontend client. Dropped silently once the
    /// session is closed.
    pub fn send_upstream_packet(&self, packet: bedrock::Packet) {
        if self.is_closed() {
            tracing::debug!(packet = packet.as_ref(), "dropping packet, session closed");
            return;
        }
        if let Err(error) = self.upstream.send_packet(packet) {
            tracing::debug!(%error, "frontend send failed");
        }
    }

    /// Queues a packet to the backend server. A silent no-op while the
    /// backend connection is not (or no longer) open.
    pub fn send_downstream_packet(&self, packet: java::ClientPacket) {
        let downstream = self.downstream.lock().expect("downstream handle poisoned");
        match downstream.as_ref() {
            Some(connection) => {
                if let Err(error) = connection.send_packet(packet) {
                    tracing::debug!(%error, "backend send failed");
                }
            }
            None => {
                tracing::debug!(packet = packet.as_ref(), "backend not open, dropping packet");
            }
        }
    }

    /// Entry point for the frontend I/O context.
    pub fn receive_upstream_packet(self: &Arc<Self>, packet: bedrock::Packet) {
        if self.is_closed() {
            return;
        }
        let Some(connector) = self.connector() else {
            return;
        };
        if let Err(error) = connector.registry().dispatch_bedrock(self, packet) {
            tracing::error!(%error, "frontend translator failed");
        }
    }

    /// Entry point for the backend I/O context.
    pub fn receive_downstream_packet(self: &Arc<Self>, packet: java::ServerPacket) {
        if self.is_closed() {
            return;
        }
        let Some(connector) = self.connector() else {
            return;
        };
        if let Err(error) = connector.registry().dispatch_java(self, packet) {
            tracing::error!(%error, "backend translator failed");
        }
    }

    pub fn confirm_teleport(&self, teleport_id: i32) {
        self.send_downstream_packet(java::ClientPacket::TeleportConfirm(java::TeleportConfirm {
            teleport_id,
        }));
    }

    /// Re-sends the authoritative position and metadata to the frontend.
    /// Used whenever the client has visibly drifted from the shadow
    /// state; safe to call repeatedly.
    pub fn recalculate_position(&self) {
        let (position, rotation, on_ground, metadata) = {
            let player = self.player();
            (
                collision::to_frontend_position(player.position),
                player.rotation,
                player.on_ground,
                player.metadata.clone(),
            )
        };
        if !metadata.is_empty() {
            self.send_upstream_packet(bedrock::Packet::SetEntityData(bedrock::SetEntityData {
                runtime_entity_id: PLAYER_RUNTIME_ID,
                metadata,
            }));
        }
        self.send_upstream_packet(bedrock::Packet::MovePlayer(bedrock::MovePlayer {
            runtime_entity_id: PLAYER_RUNTIME_ID,
            position,
            rotation,
            mode: bedrock::MoveMode::Reset,
            on_ground,
        }));
    }

    pub fn send_message(&self, message: impl Into<String>) {
        self.send_upstream_packet(bedrock::Packet::Text(bedrock::Text {
            source_name: String::new(),
            message: message.into(),
            xuid: String::new(),
        }));
    }

    /// Applies the configured scaling and cap to a requested render
    /// distance; returns what was granted.
    pub fn set_render_distance(&self, requested: i32) -> i32 {
        let granted = match self.config() {
            Some(config) => config.clamp_render_distance(requested),
            None => requested.max(1),
        };
        self.render_distance.store(granted, Ordering::Release);
        tracing::debug!(requested, granted, "render distance updated");
        granted
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance.load(Ordering::Acquire)
    }

    pub(crate) fn defer_respawn(&self, respawn: java::Respawn) {
        let mut slot = self.deferred_respawn.lock().expect("respawn slot poisoned");
        *slot = Some(respawn);
    }

    pub(crate) fn take_deferred_respawn(&self) -> Option<java::Respawn> {
        self.deferred_respawn
            .lock()
            .expect("respawn slot poisoned")
            .take()
    }

    /// Sends one channel registration to the backend.
    pub(crate) fn send_channel_registration(&self, channel: &str) {
        self.send_downstream_packet(java::ClientPacket::PluginMessage(java::PluginMessage {
            channel: String::from("minecraft:register"),
            data: channel.as_bytes().to_vec(),
        }));
    }

    pub(crate) fn send_channel_unregistration(&self, channel: &str) {
        self.send_downstream_packet(java::ClientPacket::PluginMessage(java::PluginMessage {
            channel: String::from("minecraft:unregister"),
            data: channel.as_bytes().to_vec(),
        }));
    }

    /// Replays every known plugin channel to the fresh backend
    /// connection, delayed so it lands after the server's join handling.
    pub(crate) fn schedule_channel_replay(self: &Arc<Self>) {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(CHANNEL_REPLAY_DELAY).await;
            if session.is_closed() {
                return;
            }
            let Some(connector) = session.connector() else {
                return;
            };
            let channels = connector.plugin_channels();
            if channels.is_empty() {
                return;
            }
            session.send_downstream_packet(java::ClientPacket::PluginMessage(
                java::PluginMessage {
                    channel: String::from("minecraft:register"),
                    data: channels.join("\0").into_bytes(),
                },
            ));
        });
    }

    /// Tears the session down: backend link first, then the frontend
    /// disconnect screen, then per-session state. Idempotent; later calls
    /// return immediately.
    pub fn disconnect(&self, reason: impl Into<String>) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let reason = reason.into();
        tracing::info!(address = %self.address, %reason, "session closed");

        if let Some(downstream) = self
            .downstream
            .lock()
            .expect("downstream handle poisoned")
            .take()
        {
            downstream.close();
        }
        self.upstream.disconnect(reason);
        *self.caches.lock().expect("session caches poisoned") = None;
        *self.lifecycle.lock().expect("session lifecycle poisoned") = Lifecycle::Closed;

        if let Some(connector) = self.connector() {
            connector.remove_session(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn disconnect_is_idempotent_and_detaches_from_connector() {
        let (connector, session, upstream) = testutil::session();
        assert_eq!(connector.session_count(), 1);

        session.disconnect("gone");
        session.disconnect("again");

        assert_eq!(connector.session_count(), 0);
        assert!(session.is_closed());
        assert_eq!(session.lifecycle(), Lifecycle::Closed);
        assert!(session.entity_cache().is_none());
        // Exactly one disconnect screen reached the client.
        let packets: Vec<_> = upstream.drain().collect();
        assert_eq!(packets.len(), 1);
        assert!(matches!(
            &packets[0],
            bedrock::Packet::Disconnect(d) if d.kick_message == "gone"
        ));
    }

    #[test]
    fn sends_after_close_are_silent_noops() {
        let (_connector, session, upstream) = testutil::session();
        session.disconnect("bye");
        upstream.drain().count();

        session.send_message("lost");
        session.confirm_teleport(3);
        assert_eq!(upstream.drain().count(), 0);
    }

    #[test]
    fn sends_before_backend_open_are_silent_noops() {
        let (_connector, session, _upstream) = testutil::session();
        // No downstream attached yet; must not panic or error.
        session.confirm_teleport(1);
        session.send_downstream_packet(java::ClientPacket::KeepAlive(java::KeepAlive { id: 4 }));
    }

    #[tokio::test]
    async fn second_authenticate_is_rejected() {
        let (_connector, session, _upstream) = testutil::session();
        let auth = AuthData {
            name: "Steve".into(),
            xuid: "123".into(),
        };
        session
            .authenticate(auth.clone(), ClientData::default())
            .unwrap();
        assert!(matches!(
            session.authenticate(auth, ClientData::default()),
            Err(SessionError::AlreadyAuthenticated)
        ));
    }

    #[tokio::test]
    async fn authenticate_opens_the_backend_connection() {
        let (connector, remote) = testutil::connector();
        let (session, _upstream) = testutil::session_on(&connector);
        session
            .authenticate(
                AuthData {
                    name: "Alex".into(),
                    xuid: "456".into(),
                },
                ClientData::default(),
            )
            .unwrap();
        let (handshake, credentials) = remote.wait_for_login().await;
        assert_eq!(handshake.next_state, java::NextState::Login);
        assert_eq!(handshake.protocol_version, JAVA_PROTOCOL_VERSION);
        // Offline mode never hands credentials to the backend.
        assert!(credentials.is_none());
    }

    #[tokio::test]
    async fn online_mode_forwards_configured_credentials() {
        use crate::config::{Credentials, ProxyConfig};

        let config = ProxyConfig {
            auth_mode: auth::AuthMode::Online,
            credentials: Some(Credentials {
                username: "bridge-account".into(),
                password: "hunter2".into(),
            }),
            ..ProxyConfig::default()
        };
        let (connector, remote) = testutil::connector_with(config);
        let (session, _upstream) = testutil::session_on(&connector);
        session
            .authenticate(
                AuthData {
                    name: "Alex".into(),
                    xuid: "456".into(),
                },
                ClientData::default(),
            )
            .unwrap();

        let (_, credentials) = remote.wait_for_login().await;
        assert_eq!(
            credentials,
            Some(Credentials {
                username: "bridge-account".into(),
                password: "hunter2".into(),
            })
        );
    }

    #[tokio::test]
    async fn bridged_login_seals_the_frontend_protocol_version() {
        use crate::auth::{IdentityKey, KeyProvider};
        use crate::config::ProxyConfig;
        use crate::connector::Connector;

        struct FixedKey;
        impl KeyProvider for FixedKey {
            fn load_key(&self) -> anyhow::Result<IdentityKey> {
                Ok(IdentityKey::new(*b"0123456789abcdef"))
            }
        }

        let config = ProxyConfig {
            auth_mode: auth::AuthMode::Bridged,
            ..ProxyConfig::default()
        };
        let remote = testutil::channel_remote();
        let connector = Connector::builder(config, Arc::clone(&remote) as _)
            .key_provider(Arc::new(FixedKey))
            .build();
        let (session, _upstream) = testutil::session_on(&connector);
        session
            .authenticate(
                AuthData {
                    name: "Steve".into(),
                    xuid: "123".into(),
                },
                ClientData::default(),
            )
            .unwrap();

        let handshake = remote.wait_for_handshake().await;
        let sealed = handshake
            .hostname
            .split(auth::HOSTNAME_SEPARATOR)
            .nth(2)
            .unwrap();
        let key = IdentityKey::new(*b"0123456789abcdef");
        let payload = auth::unseal_identity(&key, sealed).unwrap();
        assert_eq!(payload.protocol_version, BEDROCK_PROTOCOL_VERSION);
        assert_eq!(payload.username, "Steve");
        assert_eq!(payload.xuid, "123");
    }

    #[test]
    fn recalculate_position_resyncs_with_a_reset_move() {
        let (_connector, session, upstream) = testutil::session();
        {
            let mut player = session.player();
            player.position = crate::position::Position::new(8.0, 64.0, 8.0);
        }
        session.recalculate_position();

        let packets: Vec<_> = upstream.drain().collect();
        assert!(packets.iter().any(|packet| matches!(
            packet,
            bedrock::Packet::MovePlayer(m)
                if m.mode == bedrock::MoveMode::Reset
                    && m.runtime_entity_id == PLAYER_RUNTIME_ID
        )));
    }

    #[test]
    fn render_distance_is_clamped_through_config() {
        let (_connector, session, _upstream) = testutil::session();
        assert_eq!(session.set_render_distance(64), crate::config::MAX_RENDER_DISTANCE);
        assert_eq!(session.render_distance(), crate::config::MAX_RENDER_DISTANCE);
    }
}
