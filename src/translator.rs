//! Packet translator registry and dispatch.
//!
//! Translation is a static table from packet kind to handler, built once
//! at startup and shared immutably by every session. Embedders can
//! override individual handlers before the table is frozen; priority
//! decides who wins when two registrations target the same kind.

pub mod bedrock;
pub mod java;

use crate::{
    protocol::{
        bedrock::{Packet, PacketKind},
        java::{ServerPacket, ServerPacketKind},
    },
    session::Session,
};
use ahash::AHashMap;
use std::sync::Arc;

/// Result of a pre-dispatch hook.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    /// Swallow the packet; no translator runs and nothing is forwarded.
    Veto,
}

pub type BedrockHook = Box<dyn Fn(&Arc<Session>, &Packet) -> HookOutcome + Send + Sync>;
pub type JavaHook = Box<dyn Fn(&Arc<Session>, &ServerPacket) -> HookOutcome + Send + Sync>;

/// Handles one frontend packet kind. Translators run on the session's
/// receiving context and must not block.
pub trait BedrockTranslator: Send + Sync {
    fn translate(&self, session: &Arc<Session>, packet: Packet) -> anyhow::Result<()>;
}

/// Handles one backend packet kind.
pub trait JavaTranslator: Send + Sync {
    fn translate(&self, session: &Arc<Session>, packet: ServerPacket) -> anyhow::Result<()>;
}

struct Entry<T> {
    priority: i32,
    translator: T,
}

#[derive(Default)]
pub struct TranslatorRegistry {
    bedrock: AHashMap<PacketKind, Entry<Box<dyn BedrockTranslator>>>,
    java: AHashMap<ServerPacketKind, Entry<Box<dyn JavaTranslator>>>,
    bedrock_hooks: Vec<BedrockHook>,
    java_hooks: Vec<JavaHook>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every built-in translator at priority 0.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        bedrock::register_builtin(&mut registry);
        java::register_builtin(&mut registry);
        registry
    }

    /// Registers a frontend translator. An existing registration is only
    /// replaced when the new priority is at least as high; returns whether
    /// this registration is now the active one.
    pub fn register_bedrock(
        &mut self,
        kind: PacketKind,
        priority: i32,
        translator: Box<dyn BedrockTranslator>,
    ) -> bool {
        match self.bedrock.get(&kind) {
            Some(existing) if existing.priority > priority => false,
            _ => {
                self.bedrock.insert(
                    kind,
                    Entry {
                        priority,
                        translator,
                    },
                );
                true
            }
        }
    }

    pub fn register_java(
        &mut self,
        kind: ServerPacketKind,
        priority: i32,
        translator: Box<dyn JavaTranslator>,
    ) -> bool {
        match self.java.get(&kind) {
            Some(existing) if existing.priority > priority => false,
            _ => {
                self.java.insert(
                    kind,
                    Entry {
                        priority,
                        translator,
                    },
                );
                true
            }
        }
    }

    /// Adds a hook that sees every frontend packet before its translator.
    pub fn add_bedrock_hook(&mut self, hook: BedrockHook) {
        self.bedrock_hooks.push(hook);
    }

    pub fn add_java_hook(&mut self, hook: JavaHook) {
        self.java_hooks.push(hook);
    }

    pub fn dispatch_bedrock(&self, session: &Arc<Session>, packet: Packet) -> anyhow::Result<()> {
        for hook in &self.bedrock_hooks {
            if hook(session, &packet) == HookOutcome::Veto {
                tracing::debug!(packet = packet.as_ref(), "packet vetoed by hook");
                return Ok(());
            }
        }
        match self.bedrock.get(&PacketKind::from(&packet)) {
            Some(entry) => entry.translator.translate(session, packet),
            None => {
                tracing::debug!(packet = packet.as_ref(), "no frontend translator, dropping");
                Ok(())
            }
        }
    }

    /// Dispatches a backend packet, coalescing dimension switches: a
    /// respawn is parked instead of applied, and only the latest parked
    /// one runs, right before the next non-respawn packet. Backends that
    /// send several respawns in a row (end portals, some server plugins)
    /// otherwise force the frontend through that many dimension screens.
    pub fn dispatch_java(&self, session: &Arc<Session>, packet: ServerPacket) -> anyhow::Result<()> {
        if let ServerPacket::Respawn(respawn) = packet {
            session.defer_respawn(respawn);
            return Ok(());
        }
        if let Some(respawn) = session.take_deferred_respawn() {
            self.dispatch_java_now(session, ServerPacket::Respawn(respawn))?;
        }
        self.dispatch_java_now(session, packet)
    }

    fn dispatch_java_now(&self, session: &Arc<Session>, packet: ServerPacket) -> anyhow::Result<()> {
        for hook in &self.java_hooks {
            if hook(session, &packet) == HookOutcome::Veto {
                tracing::debug!(packet = packet.as_ref(), "packet vetoed by hook");
                return Ok(());
            }
        }
        match self.java.get(&ServerPacketKind::from(&packet)) {
            Some(entry) => entry.translator.translate(session, packet),
            None => {
                tracing::debug!(packet = packet.as_ref(), "no backend translator, dropping");
                Ok(())
            }
        }
    }
}
