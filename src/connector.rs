//! The connector owns every live session and the pieces they share: the
//! translator table, the backend dialer, static registry payloads, and
//! the plugin channel list. Embedders hold the `Arc<Connector>`; sessions
//! keep a weak reference back so a dropped connector tears nothing down
//! twice.

use crate::{
    auth::{AuthData, KeyFileProvider, KeyProvider, StaticRegistries},
    config::ProxyConfig,
    connection::{RemoteServer, UpstreamConnection},
    session::Session,
    translator::{HookOutcome, TranslatorRegistry},
    world::{CachedWorldManager, WorldManager},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

/// Runs for every accepted session; a veto refuses the connection.
/// Hooks run inline on the accepting context, so they must be cheap.
pub type ConnectHook = Box<dyn Fn(&Arc<Session>) -> HookOutcome + Send + Sync>;

/// Runs for every authentication attempt; a veto rejects it.
pub type AuthHook = Box<dyn Fn(&Arc<Session>, &AuthData) -> HookOutcome + Send + Sync>;

/// Observes session departure.
pub type DisconnectHook = Box<dyn Fn(&Arc<Session>) + Send + Sync>;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);
const SHUTDOWN_POLL_LIMIT: u32 = 50;

pub struct Connector {
    config: Arc<ProxyConfig>,
    registry: TranslatorRegistry,
    remote: Arc<dyn RemoteServer>,
    world: Arc<dyn WorldManager>,
    key_provider: Option<Arc<dyn KeyProvider>>,
    registries: StaticRegistries,
    sessions: Mutex<Vec<Arc<Session>>>,
    plugin_channels: Mutex<Vec<String>>,
    connect_hooks: Vec<ConnectHook>,
    auth_hooks: Vec<AuthHook>,
    disconnect_hooks: Vec<DisconnectHook>,
    shutting_down: AtomicBool,
}

impl Connector {
    pub fn builder(config: ProxyConfig, remote: Arc<dyn RemoteServer>) -> ConnectorBuilder {
        ConnectorBuilder {
            config,
            remote,
            world: None,
            registry: None,
            key_provider: None,
            registries: StaticRegistries::default(),
            connect_hooks: Vec::new(),
            auth_hooks: Vec::new(),
            disconnect_hooks: Vec::new(),
        }
    }

    pub fn config(&self) -> Arc<ProxyConfig> {
        Arc::clone(&self.config)
    }

    pub fn registry(&self) -> &TranslatorRegistry {
        &self.registry
    }

    pub fn remote(&self) -> &Arc<dyn RemoteServer> {
        &self.remote
    }

    pub fn world(&self) -> &Arc<dyn WorldManager> {
        &self.world
    }

    pub fn key_provider(&self) -> Option<Arc<dyn KeyProvider>> {
        self.key_provider.as_ref().map(Arc::clone)
    }

    pub fn registries(&self) -> &StaticRegistries {
        &self.registries
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().expect("session list poisoned").len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Creates a session for an accepted frontend connection. During
    /// shutdown the session is created already-disconnected so the codec
    /// still delivers the disconnect screen.
    pub fn accept_session(
        self: &Arc<Self>,
        upstream: UpstreamConnection,
        address: String,
    ) -> Arc<Session> {
        let session = Session::new(
            Arc::downgrade(self),
            upstream,
            address,
            self.config.cache_chunks,
        );
        if self.is_shutting_down() {
            session.disconnect("Proxy is shutting down");
            return session;
        }
        for hook in &self.connect_hooks {
            if hook(&session) == HookOutcome::Veto {
                session.disconnect("Connection refused");
                return session;
            }
        }
        tracing::info!(address = %session.address(), "session accepted");
        self.sessions
            .lock()
            .expect("session list poisoned")
            .push(Arc::clone(&session));
        session
    }

    /// Runs the authentication hooks; `false` means the attempt was
    /// vetoed.
    pub(crate) fn check_auth(&self, session: &Arc<Session>, auth_data: &AuthData) -> bool {
        for hook in &self.auth_hooks {
            if hook(session, auth_data) == HookOutcome::Veto {
                tracing::info!(
                    name = %auth_data.name,
                    address = %session.address(),
                    "authentication vetoed"
                );
                return false;
            }
        }
        true
    }

    pub(crate) fn remove_session(&self, session: &Session) {
        let removed = {
            let mut sessions = self.sessions.lock().expect("session list poisoned");
            let index = sessions
                .iter()
                .position(|entry| std::ptr::eq(Arc::as_ptr(entry), session));
            index.map(|index| sessions.remove(index))
        };
        if let Some(removed) = removed {
            for hook in &self.disconnect_hooks {
                hook(&removed);
            }
        }
    }

    /// Snapshot of every live session, for broadcasts.
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.lock().expect("session list poisoned").clone()
    }

    pub fn plugin_channels(&self) -> Vec<String> {
        self.plugin_channels
            .lock()
            .expect("plugin channel list poisoned")
            .clone()
    }

    /// Registers a plugin messaging channel for all sessions, current and
    /// future. Returns whether the channel was new; a duplicate sends
    /// nothing.
    pub fn register_plugin_channel(&self, channel: impl Into<String>) -> bool {
        let channel = channel.into();
        {
            let mut channels = self
                .plugin_channels
                .lock()
                .expect("plugin channel list poisoned");
            if channels.contains(&channel) {
                return false;
            }
            channels.push(channel.clone());
        }
        for session in self.sessions() {
            session.send_channel_registration(&channel);
        }
        true
    }

    pub fn unregister_plugin_channel(&self, channel: &str) -> bool {
        {
            let mut channels = self
                .plugin_channels
                .lock()
                .expect("plugin channel list poisoned");
            let Some(index) = channels.iter().position(|entry| entry == channel) else {
                return false;
            };
            channels.remove(index);
        }
        for session in self.sessions() {
            session.send_channel_unregistration(channel);
        }
        true
    }

    /// Disconnects every session and waits for embedder-held handles to
    /// drain, polling with a bounded budget so shutdown cannot hang on a
    /// leaked session.
    pub async fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!(sessions = self.session_count(), "connector shutting down");
        for session in self.sessions() {
            session.disconnect("Proxy is shutting down");
        }
        let mut polls = 0;
        while self.session_count() > 0 && polls < SHUTDOWN_POLL_LIMIT {
            tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
            polls += 1;
        }
        let remaining = self.session_count();
        if remaining > 0 {
            tracing::warn!(remaining, "shutdown proceeding with sessions still registered");
        } else {
            tracing::info!("connector shutdown complete");
        }
    }
}

pub struct ConnectorBuilder {
    config: ProxyConfig,
    remote: Arc<dyn RemoteServer>,
    world: Option<Arc<dyn WorldManager>>,
    registry: Option<TranslatorRegistry>,
    key_provider: Option<Arc<dyn KeyProvider>>,
    registries: StaticRegistries,
    connect_hooks: Vec<ConnectHook>,
    auth_hooks: Vec<AuthHook>,
    disconnect_hooks: Vec<DisconnectHook>,
}

impl ConnectorBuilder {
    /// Replaces the default [`TranslatorRegistry::standard`] table.
    pub fn registry(mut self, registry: TranslatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the chunk-cache-backed world access, for platforms with
    /// a live world to answer from.
    pub fn world(mut self, world: Arc<dyn WorldManager>) -> Self {
        self.world = Some(world);
        self
    }

    pub fn key_provider(mut self, provider: Arc<dyn KeyProvider>) -> Self {
        self.key_provider = Some(provider);
        self
    }

    pub fn registries(mut self, registries: StaticRegistries) -> Self {
        self.registries = registries;
        self
    }

    pub fn on_session_connect(mut self, hook: ConnectHook) -> Self {
        self.connect_hooks.push(hook);
        self
    }

    pub fn on_authentication(mut self, hook: AuthHook) -> Self {
        self.auth_hooks.push(hook);
        self
    }

    pub fn on_session_disconnect(mut self, hook: DisconnectHook) -> Self {
        self.disconnect_hooks.push(hook);
        self
    }

    pub fn build(self) -> Arc<Connector> {
        let key_provider = self
            .key_provider
            .or_else(|| Some(Arc::new(KeyFileProvider::new(&self.config.bridged_key_file)) as _));
        Arc::new(Connector {
            config: Arc::new(self.config),
            registry: self.registry.unwrap_or_else(TranslatorRegistry::standard),
            remote: self.remote,
            world: self.world.unwrap_or_else(|| Arc::new(CachedWorldManager)),
            key_provider,
            registries: self.registries,
            sessions: Mutex::new(Vec::new()),
            plugin_channels: Mutex::new(Vec::new()),
            connect_hooks: self.connect_hooks,
            auth_hooks: self.auth_hooks,
            disconnect_hooks: self.disconnect_hooks,
            shutting_down: AtomicBool::new(false),
        })
    }
}
