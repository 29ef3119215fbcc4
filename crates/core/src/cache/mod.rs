//! SQLite-backed storage for the offline worker's versioned caches.
//!
//! This module provides a persistent, multi-store request cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named stores that are created, listed, and dropped as a unit
//! - Request-addressed entries keyed by a SHA-256 of method and URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{RequestKey, StoredResponse};
pub use storage::CacheStorage;
