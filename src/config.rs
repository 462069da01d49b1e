//! Proxy configuration. Format-agnostic: the embedding platform picks
//! the serde format and hands us the deserialized value.

use crate::auth::AuthMode;
use serde::Deserialize;
use std::path::PathBuf;

/// Hard ceiling on the render distance forwarded to the backend.
pub const MAX_RENDER_DISTANCE: i32 = 32;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// Backend server to bridge sessions to.
    pub remote_address: String,
    pub remote_port: u16,
    pub auth_mode: AuthMode,
    /// Backend credentials, only consulted in online mode.
    pub credentials: Option<Credentials>,
    /// Key file for bridged mode. Missing or unreadable keys degrade the
    /// session to offline behavior.
    pub bridged_key_file: PathBuf,
    /// Whether sessions keep per-chunk block state for movement
    /// correction. Costs memory per session.
    pub cache_chunks: bool,
    /// Name shown to frontend clients while the backend world loads.
    pub level_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            remote_address: "127.0.0.1".into(),
            remote_port: 25565,
            auth_mode: AuthMode::default(),
            credentials: None,
            bridged_key_file: PathBuf::from("key.aes"),
            cache_chunks: false,
            level_name: "Bedrock level".into(),
        }
    }
}

impl ProxyConfig {
    /// Clamps a client-requested render distance. The frontend asks for
    /// its raw setting; the backend works in a square grid, so the
    /// diagonal needs headroom before the cap applies.
    pub fn clamp_render_distance(&self, requested: i32) -> i32 {
        let scaled = (f64::from(requested.max(1)) * std::f64::consts::SQRT_2).ceil() as i32;
        scaled.min(MAX_RENDER_DISTANCE)
    }
}
