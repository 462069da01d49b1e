//! Typed packet values exchanged with the two protocol codecs.
//!
//! Wire encoding and decoding are owned by the platform codec layer; the
//! session engine only ever sees (and produces) the decoded forms below.
//! Only the fields the translators actually consume are modeled. Payloads
//! the engine passes through untouched (registry listings, chunk sections
//! headed for the frontend) are carried as opaque [`RegistryBlob`]s.

use std::{fmt, ops::Deref, sync::Arc};

pub mod bedrock;
pub mod java;

/// Frontend protocol version this engine targets.
pub const BEDROCK_PROTOCOL_VERSION: i32 = 407;

/// Backend protocol version this engine targets.
pub const JAVA_PROTOCOL_VERSION: i32 = 736;

/// Pre-encoded payload produced by the static data tables (biome
/// definitions, entity identifiers, creative content). Opaque to the
/// engine; cheap to clone into every session's start-up packets.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistryBlob(Arc<[u8]>);

impl RegistryBlob {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }
}

impl Deref for RegistryBlob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RegistryBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryBlob({} bytes)", self.0.len())
    }
}
