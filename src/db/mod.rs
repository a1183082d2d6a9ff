//! Database module
//!
//! Handles SQLite connection pooling, transactions and migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
