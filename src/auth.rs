//! Authentication modes and the bridged-identity handshake.
//!
//! In bridged mode the frontend player's identity is proven out-of-band:
//! the proxy seals a small payload describing the client and smuggles it
//! through the hostname field of the otherwise-standard backend
//! handshake, NUL-separated so an unmodified backend still parses the
//! hostname while a cooperating verifier plugin can recognize and trust
//! the appended blob.

use crate::protocol::RegistryBlob;
use aes::{cipher::generic_array::GenericArray, Aes128};
use anyhow::{bail, Context};
use bincode::Options;
use cfb8::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, slice};

/// How a session resolves its backend identity. Chosen once per session
/// at connect time; the modes are mutually exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Configured credentials are forwarded and the backend performs its
    /// native identity check.
    Online,
    /// No credential exchange; the backend must skip verification itself.
    #[default]
    Offline,
    /// Identity is sealed into the handshake hostname for a backend-side
    /// verifier plugin.
    Bridged,
}

/// Identity of the frontend player as presented at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthData {
    pub name: String,
    pub xuid: String,
}

/// Device/platform details the frontend sends during its handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientData {
    pub game_version: String,
    pub device_os: i32,
    pub language: String,
    pub input_mode: i32,
}

/// Marker the backend-side verifier looks for in the hostname field.
pub const IDENTITY_MARKER: &str = "^BridgeData^";

/// Separator between the real hostname, the marker and the sealed blob.
pub const HOSTNAME_SEPARATOR: char = '\0';

/// The signed/sealed identity proof. Field order is part of the format
/// shared with the verifier plugin; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub protocol_version: i32,
    pub username: String,
    pub xuid: String,
    pub device_os: i32,
    pub language: String,
    pub input_mode: i32,
    pub address: String,
}

/// Symmetric key shared with the verifier plugin.
#[derive(Clone)]
pub struct IdentityKey([u8; 16]);

impl IdentityKey {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Supplies the bridged-identity key. External collaborator: absence or
/// failure degrades the session to offline behavior instead of failing
/// the connection.
pub trait KeyProvider: Send + Sync {
    fn load_key(&self) -> anyhow::Result<IdentityKey>;
}

/// Reads the raw 16-byte key from a file, optionally falling back to a
/// copy inside the companion plugin's data folder.
pub struct KeyFileProvider {
    path: PathBuf,
    plugin_data_folder: Option<PathBuf>,
}

impl KeyFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            plugin_data_folder: None,
        }
    }

    pub fn with_plugin_data_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.plugin_data_folder = Some(folder.into());
        self
    }
}

impl KeyProvider for KeyFileProvider {
    fn load_key(&self) -> anyhow::Result<IdentityKey> {
        let bytes = match fs_err::read(&self.path) {
            Ok(bytes) => bytes,
            Err(primary) => match &self.plugin_data_folder {
                Some(folder) => fs_err::read(folder.join(self.path.file_name().unwrap_or_default()))
                    .with_context(|| format!("reading identity key: {primary}"))?,
                None => return Err(primary).context("reading identity key"),
            },
        };
        let key: [u8; 16] = bytes
            .as_slice()
            .try_into()
            .ok()
            .context("identity key file must contain exactly 16 bytes")?;
        Ok(IdentityKey(key))
    }
}

type Encryptor = cfb8::Encryptor<Aes128>;
type Decryptor = cfb8::Decryptor<Aes128>;

/// Seals an identity payload for transport in the handshake hostname.
/// CFB8 with the key doubling as IV, hex-encoded so the result survives
/// the hostname's string type.
pub fn seal_identity(key: &IdentityKey, payload: &IdentityPayload) -> anyhow::Result<String> {
    let mut data = bincode::options().serialize(payload)?;
    let mut encryptor = Encryptor::new(&key.0.into(), &key.0.into());
    for byte in &mut data {
        encryptor.encrypt_block_mut(GenericArray::from_mut_slice(slice::from_mut(byte)));
    }
    let mut encoded = String::with_capacity(data.len() * 2);
    for byte in &data {
        encoded.push_str(&format!("{byte:02x}"));
    }
    Ok(encoded)
}

/// Inverse of [`seal_identity`]. The verifier side of the format; also
/// exercised by tests here.
pub fn unseal_identity(key: &IdentityKey, sealed: &str) -> anyhow::Result<IdentityPayload> {
    if sealed.len() % 2 != 0 {
        bail!("sealed identity has odd length");
    }
    let mut data = Vec::with_capacity(sealed.len() / 2);
    for chunk in sealed.as_bytes().chunks(2) {
        let text = std::str::from_utf8(chunk)?;
        data.push(u8::from_str_radix(text, 16).context("sealed identity is not hex")?);
    }
    let mut decryptor = Decryptor::new(&key.0.into(), &key.0.into());
    for byte in &mut data {
        decryptor.decrypt_block_mut(GenericArray::from_mut_slice(slice::from_mut(byte)));
    }
    bincode::options()
        .deserialize(&data)
        .context("sealed identity payload is malformed")
}

/// Builds the handshake hostname carrying a sealed identity.
pub fn bridged_hostname(hostname: &str, sealed: &str) -> String {
    format!("{hostname}{HOSTNAME_SEPARATOR}{IDENTITY_MARKER}{HOSTNAME_SEPARATOR}{sealed}")
}

/// Registry payloads handed to every session during initialization.
/// Produced by the external static data tables.
#[derive(Clone, Default)]
pub struct StaticRegistries {
    pub biome_definitions: RegistryBlob,
    pub entity_identifiers: RegistryBlob,
    pub creative_content: RegistryBlob,
}
