//! Rolling feed of user actions, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::store::{KeyValueStore, get_typed, set_typed};

pub const ACTIVITIES_KEY: &str = "savedActivities";
pub const MAX_ACTIVITIES: usize = 50;
pub const DEFAULT_RECENT_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    /// Symbol name shown next to the entry
    pub icon: String,
}

impl ActivityEntry {
    pub fn new(action: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            timestamp: Utc::now(),
            icon: icon.into(),
        }
    }
}

pub struct ActivityLog {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<ActivityEntry>,
    undecodable: bool,
}

impl ActivityLog {
    /// Load the persisted feed. A missing feed starts empty. A feed that does
    /// not decode also reads as empty but stays on disk: `record` refuses to
    /// write until `clear` replaces it.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let (entries, undecodable) =
            match get_typed::<Vec<ActivityEntry>>(store.as_ref(), ACTIVITIES_KEY) {
                Ok(entries) => (entries.unwrap_or_default(), false),
                Err(StoreError::Decode { source, .. }) => {
                    warn!(error = %source, "Saved activity feed could not be decoded, leaving it untouched");
                    (Vec::new(), true)
                }
                Err(e) => return Err(e),
            };
        Ok(Self {
            store,
            entries,
            undecodable,
        })
    }

    pub fn record(
        &mut self,
        action: impl Into<String>,
        icon: impl Into<String>,
    ) -> Result<&ActivityEntry, StoreError> {
        if self.undecodable {
            return Err(StoreError::Undecodable {
                key: ACTIVITIES_KEY.to_string(),
            });
        }
        let entry = ActivityEntry::new(action, icon);
        debug!(action = %entry.action, "Recording activity");
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ACTIVITIES);
        self.save()?;
        Ok(&self.entries[0])
    }

    pub fn recent(&self, limit: usize) -> &[ActivityEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn all(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.save()?;
        self.undecodable = false;
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        set_typed(self.store.as_ref(), ACTIVITIES_KEY, &self.entries)
    }
}
