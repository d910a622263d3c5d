//! `SoulAce` Core Library
//!
//! Shared functionality for `SoulAce` components:
//! - Mood tags, coarse mood groups and the matching functions
//! - Relay event protocol spoken over the presence channel
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers and common error types

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod matcher;
pub mod mood;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use events::{ClientEvent, ServerEvent};
pub use mood::{MoodError, MoodGroup, MoodPreference, MoodSet, MoodTag};
