//! Durable key-value storage.
//!
//! Everything the app persists lives under a fixed key in one store: the
//! cached gate redirect, the edited container list, favorites and the
//! activity feed.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::StoreError;

/// Key under which the trusted redirect URL is cached.
pub const REDIRECT_URL_KEY: &str = "savedWebViewURL";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read `key` and decode it as `T`. Only a missing key is `None`; a value of
/// the wrong shape is `StoreError::Decode`.
pub fn get_typed<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)?
        .map(|value| {
            serde_json::from_value(value).map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

pub fn set_typed<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value)
}

/// The persisted gate decision: an optional redirect URL.
#[derive(Clone)]
pub struct RedirectCache {
    store: Arc<dyn KeyValueStore>,
}

impl RedirectCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The cached URL. An empty or malformed value counts as no cached
    /// decision; the next trusted redirect replaces it.
    pub fn load(&self) -> Result<Option<String>, StoreError> {
        let url: Option<String> = match get_typed(self.store.as_ref(), REDIRECT_URL_KEY) {
            Ok(url) => url,
            Err(StoreError::Decode { source, .. }) => {
                warn!(error = %source, "Ignoring malformed cached redirect");
                None
            }
            Err(e) => return Err(e),
        };
        let url = url.filter(|u| !u.is_empty());
        debug!(cached = url.is_some(), "Checked cached redirect");
        Ok(url)
    }

    pub fn save(&self, url: &str) -> Result<(), StoreError> {
        set_typed(self.store.as_ref(), REDIRECT_URL_KEY, &url)?;
        info!("Cached gate redirect");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(REDIRECT_URL_KEY)?;
        info!("Cleared cached gate redirect");
        Ok(())
    }
}
