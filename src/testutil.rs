//! Shared fixtures for unit tests: an in-memory backend and canned
//! connector/session setups.

use crate::{
    config::{Credentials, ProxyConfig},
    connection::{DownstreamConnection, RemoteServer, UpstreamConnection},
    connector::Connector,
    protocol::{bedrock, java},
    session::Session,
};
use futures::future::BoxFuture;
use std::{sync::Arc, sync::Mutex, time::Duration};

/// Backend that hands out in-memory connections and records every
/// login attempt it saw.
#[derive(Default)]
pub struct ChannelRemote {
    logins: Mutex<Vec<(java::Handshake, Option<Credentials>)>>,
    receivers: Mutex<Vec<flume::Receiver<java::ClientPacket>>>,
}

impl ChannelRemote {
    pub async fn wait_for_login(&self) -> (java::Handshake, Option<Credentials>) {
        for _ in 0..100 {
            if let Some(login) = self.logins.lock().unwrap().first().cloned() {
                return login;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("backend never received a handshake");
    }

    pub async fn wait_for_handshake(&self) -> java::Handshake {
        self.wait_for_login().await.0
    }
}

impl RemoteServer for ChannelRemote {
    fn open(
        &self,
        handshake: java::Handshake,
        credentials: Option<Credentials>,
    ) -> BoxFuture<'static, anyhow::Result<DownstreamConnection>> {
        self.logins.lock().unwrap().push((handshake, credentials));
        let (connection, receiver) = DownstreamConnection::channel();
        self.receivers.lock().unwrap().push(receiver);
        Box::pin(futures::future::ready(Ok(connection)))
    }
}

pub fn channel_remote() -> Arc<ChannelRemote> {
    Arc::new(ChannelRemote::default())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Connector over `config` with the standard registry and an in-memory
/// backend.
pub fn connector_with(config: ProxyConfig) -> (Arc<Connector>, Arc<ChannelRemote>) {
    init_tracing();
    let remote = channel_remote();
    let connector = Connector::builder(config, Arc::clone(&remote) as _).build();
    (connector, remote)
}

/// Connector with default config.
pub fn connector() -> (Arc<Connector>, Arc<ChannelRemote>) {
    connector_with(ProxyConfig::default())
}

/// Connector with chunk caching turned on, for collision-path tests.
pub fn caching_connector() -> (Arc<Connector>, Arc<ChannelRemote>) {
    connector_with(ProxyConfig {
        cache_chunks: true,
        ..ProxyConfig::default()
    })
}

/// Accepts a session on `connector`, returning it together with the
/// receiver draining packets sent to the frontend client.
pub fn session_on(connector: &Arc<Connector>) -> (Arc<Session>, flume::Receiver<bedrock::Packet>) {
    let (upstream, receiver) = UpstreamConnection::channel();
    let session = connector.accept_session(upstream, String::from("203.0.113.5:19132"));
    (session, receiver)
}

/// One-call setup for tests that only need a single session.
pub fn session() -> (Arc<Connector>, Arc<Session>, flume::Receiver<bedrock::Packet>) {
    let (connector, _remote) = connector();
    let (session, receiver) = session_on(&connector);
    (connector, session, receiver)
}

/// Wires an in-memory backend connection straight into `session`,
/// bypassing the async login path. Returns the receiver draining packets
/// sent to the backend.
pub fn attach_backend(session: &Session) -> flume::Receiver<java::ClientPacket> {
    let (connection, receiver) = DownstreamConnection::channel();
    session.attach_downstream(connection);
    receiver
}
