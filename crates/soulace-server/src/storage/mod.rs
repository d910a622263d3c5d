//! `SQLite` storage for `SoulAce` server.
//!
//! Provides persistence for user and listener profiles, mood history, and
//! chat requests.

mod db;
mod models;
mod queries;
mod queries_chat;


pub use db::SoulaceDatabase;
pub use models::*;
pub use soulace_core::db::DatabaseError;
