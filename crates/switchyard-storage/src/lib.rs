// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Switchyard gateway.
//!
//! Holds the append-only usage ledger and the pricing table. Schema
//! migrations are embedded, and all access is serialized through a single
//! `tokio-rusqlite` connection.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
