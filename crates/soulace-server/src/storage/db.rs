//! `SQLite` database for `SoulAce` server.

soulace_core::define_database!(SoulaceDatabase, "SoulAce database migrations complete");
