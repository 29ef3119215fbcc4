//! Core types and shared functionality for folio.
//!
//! This crate provides:
//! - Versioned cache storage with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheStorage, RequestKey, StoredResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
