//! Persistent TTL cache for provider responses
//!
//! Entries live in a single fjall keyspace, postcard-encoded together with
//! their expiry. Expired entries are dropped lazily on lookup.

use crate::{Result, WeatherError};
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

const KEYSPACE: &str = "responses";

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    /// Unix seconds after which the entry is stale
    expires_at_secs: u64,
    payload: T,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now_secs: u64) -> bool {
        now_secs < self.expires_at_secs
    }
}

pub struct PersistentCache {
    keyspace: Keyspace,
}

impl From<fjall::Error> for WeatherError {
    fn from(err: fjall::Error) -> Self {
        WeatherError::cache(err.to_string())
    }
}

impl From<postcard::Error> for WeatherError {
    fn from(err: postcard::Error) -> Self {
        WeatherError::cache(err.to_string())
    }
}

impl From<task::JoinError> for WeatherError {
    fn from(err: task::JoinError) -> Self {
        WeatherError::cache(format!("cache task failed: {err}"))
    }
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|e| WeatherError::cache(format!("system clock before epoch: {e}")))
}

impl PersistentCache {
    /// Open (or create) the cache database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let database = fjall::Database::builder(path.as_ref()).open()?;
        let keyspace = database.keyspace(KEYSPACE, fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { keyspace })
    }

    /// Run a keyspace operation on the blocking pool
    async fn with_keyspace<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&Keyspace) -> fjall::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let keyspace = self.keyspace.clone();
        Ok(task::spawn_blocking(move || op(&keyspace)).await??)
    }

    /// Store `value` under `key` until `ttl` has passed
    #[tracing::instrument(level = "debug", skip(self, value))]
    pub async fn put<T: Serialize>(&self, key: &str, value: T, ttl: Duration) -> Result<()> {
        let encoded = postcard::to_stdvec(&CacheEntry {
            expires_at_secs: unix_now()?.saturating_add(ttl.as_secs()),
            payload: value,
        })?;
        let key = key.as_bytes().to_vec();

        self.with_keyspace(move |keyspace| keyspace.insert(key, encoded))
            .await
    }

    /// Fresh value for `key`, if any
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let lookup = key.as_bytes().to_vec();
        let raw = self
            .with_keyspace(move |keyspace| Ok(keyspace.get(lookup)?.map(|bytes| bytes.to_vec())))
            .await?;

        let Some(raw) = raw else {
            tracing::debug!("cache miss");
            return Ok(None);
        };

        let entry: CacheEntry<T> = postcard::from_bytes(&raw)?;
        if entry.is_fresh(unix_now()?) {
            tracing::debug!("cache hit");
            return Ok(Some(entry.payload));
        }

        tracing::debug!("stale entry evicted");
        self.remove(key).await?;
        Ok(None)
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        self.with_keyspace(move |keyspace| keyspace.remove(key)).await
    }
}
