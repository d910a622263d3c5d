//! `SoulAce` Server Library
//!
//! Core functionality for the `SoulAce` backend:
//! - `SQLite` storage for profiles, moods, listeners and chat requests
//! - JWT validation for caller identity
//! - Presence registry and per-connection event hub
//! - Relay that forwards chat handshake events between connected parties
//! - HTTP API and WebSocket endpoint (axum)

pub mod auth;
pub mod registry;
pub mod router;
pub mod server;
pub mod storage;
