//! Named store and entry operations.
//!
//! A store is a namespace of request entries. The worker keeps exactly one
//! store per deployed version and drops the others on activation.

use super::connection::CacheDb;
use super::entries::{RequestKey, StoredResponse};
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

struct EncodedEntry {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EncodedEntry {
    fn encode(key: &RequestKey, response: &StoredResponse) -> Result<Self, Error> {
        Ok(Self {
            key_hash: key.hash(),
            method: key.method.clone(),
            url: key.url.clone(),
            status: response.status,
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.clone(),
        })
    }
}

const UPSERT_ENTRY: &str = "INSERT INTO cache_entries (
        store_name, key_hash, method, url, status_code, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(store_name, key_hash) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        status_code = excluded.status_code,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

const ENSURE_STORE: &str = "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)";

fn write_entry(conn: &rusqlite::Connection, store: &str, entry: &EncodedEntry, now: &str) -> Result<(), Error> {
    conn.execute(
        UPSERT_ENTRY,
        params![store, entry.key_hash, entry.method, entry.url, entry.status, entry.headers_json, entry.body, now],
    )?;
    Ok(())
}

impl CacheDb {
    /// Create the named store if it does not exist yet.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(ENSURE_STORE, params![name, now])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List every store name, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Drop a store together with all of its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.unchecked_transaction()?;
                tx.execute("DELETE FROM cache_entries WHERE store_name = ?1", params![name])?;
                let removed = tx.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for a request in one store.
    pub async fn get_entry(&self, store: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let store = store.to_string();
        let key_hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status_code, headers_json, body FROM cache_entries
                     WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((row.get::<_, u16>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?))
                });

                match result {
                    Ok((status, headers_json, body)) => {
                        let headers = serde_json::from_str(&headers_json)?;
                        Ok(Some(StoredResponse { status, headers, body }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or overwrite one entry, creating the store if needed.
    pub async fn put_entry(&self, store: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        let store = store.to_string();
        let entry = EncodedEntry::encode(key, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.unchecked_transaction()?;
                tx.execute(ENSURE_STORE, params![store, now])?;
                write_entry(&tx, &store, &entry, &now)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Write a batch of entries in a single transaction.
    ///
    /// Either every entry is stored or none is.
    pub async fn put_entries(&self, store: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        let store = store.to_string();
        let encoded = entries
            .iter()
            .map(|(key, response)| EncodedEntry::encode(key, response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.unchecked_transaction()?;
                tx.execute(ENSURE_STORE, params![store, now])?;
                for entry in &encoded {
                    write_entry(&tx, &store, entry, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries held by a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store_name = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
