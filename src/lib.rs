//! Session engine for a Bedrock-to-Java protocol translation proxy.
//!
//! Frontend (Bedrock) clients connect through a platform-owned codec;
//! each accepted connection becomes a [`session::Session`] bridged to a
//! backend (Java) server opened through [`connection::RemoteServer`].
//! Decoded packets from either side flow through the
//! [`translator::TranslatorRegistry`], which rewrites them for the other
//! protocol and maintains the per-session caches doing the stateful
//! parts: entity id mapping, teleport confirmation, open windows,
//! scoreboards, and optionally block geometry for movement correction.
//!
//! The [`connector::Connector`] owns the session set and everything
//! sessions share. Embedders build one, feed it accepted connections,
//! and pump decoded packets into the sessions' receive methods from
//! whichever I/O contexts their codecs run on.

pub mod auth;
pub mod cache;
pub mod collision;
pub mod config;
pub mod connection;
pub mod connector;
pub mod entity;
pub mod position;
pub mod protocol;
pub mod session;
pub mod translator;
pub mod world;

#[cfg(test)]
mod testutil;
