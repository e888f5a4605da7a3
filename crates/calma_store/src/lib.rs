//! SQLite-backed persistence for Calma.
//!
//! One file-backed database holds users, the login-token / bearer-session
//! auth tables, mood check-ins and their generated relaxation sessions.
//! Schema setup is idempotent and runs on open.

mod sqlite;

pub use sqlite::SqliteStore;
