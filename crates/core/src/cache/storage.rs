//! The storage seam used by the offline worker.

use std::sync::Arc;

use async_trait::async_trait;

use super::connection::CacheDb;
use super::entries::{RequestKey, StoredResponse};
use crate::Error;

/// A collection of named request/response stores.
///
/// Mirrors the operations a worker needs from its host platform: open a
/// store, enumerate and drop stores, and read or write entries in one.
/// Concurrent writes to the same key are last-write-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if missing.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Every store name, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Drop a store and its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// The stored response for `key` in store `name`, if any.
    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Insert or overwrite the entry for `key`.
    async fn put(&self, name: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error>;

    /// Store every entry, or none of them.
    async fn put_all(&self, name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.get_entry(name, key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        self.put_entry(name, key, response).await
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        self.put_entries(name, entries).await
    }
}

#[async_trait]
impl<T: CacheStorage + ?Sized> CacheStorage for Arc<T> {
    async fn open(&self, name: &str) -> Result<(), Error> {
        (**self).open(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        (**self).keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        (**self).delete(name).await
    }

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        (**self).match_request(name, key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        (**self).put(name, key, response).await
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        (**self).put_all(name, entries).await
    }
}
