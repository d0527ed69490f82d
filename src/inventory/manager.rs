use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::errors::InventoryError;
use crate::inventory::activity::ActivityLog;
use crate::inventory::container::{
    Container, ContainerUpdate, FIELD_CAPACITY, FIELD_LOCATION, FIELD_PH, FIELD_STATUS,
    FIELD_TEMPERATURE, FIELD_VOLUME, bundled_catalog,
};
use crate::store::{KeyValueStore, get_typed, set_typed};

pub const CONTAINERS_KEY: &str = "SavedContainers";

/// Change notification for anything showing the container list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    Updated { id: u32 },
    Added { id: u32 },
    Removed { id: u32 },
    Reset,
}

/// Owns the container list and keeps the store, activity feed and
/// subscribers in step with every edit.
pub struct InventoryManager {
    store: Arc<dyn KeyValueStore>,
    containers: Vec<Container>,
    activity: ActivityLog,
    events: broadcast::Sender<InventoryEvent>,
}

impl InventoryManager {
    /// Load the saved list, falling back to the bundled catalog only when
    /// nothing has been saved yet. A saved list that does not decode is an
    /// error and is left on disk.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, InventoryError> {
        let saved: Option<Vec<Container>> = get_typed(store.as_ref(), CONTAINERS_KEY)?;
        match saved {
            Some(containers) => {
                debug!(count = containers.len(), "Loaded saved containers");
                Self::with_containers(store, containers)
            }
            None => {
                debug!("No saved containers, seeding from bundled catalog");
                Self::from_catalog(store)
            }
        }
    }

    /// Replace whatever is saved with the bundled catalog.
    pub fn from_catalog(store: Arc<dyn KeyValueStore>) -> Result<Self, InventoryError> {
        let containers = bundled_catalog()?;
        set_typed(store.as_ref(), CONTAINERS_KEY, &containers)?;
        debug!(count = containers.len(), "Seeded containers from bundled catalog");
        Self::with_containers(store, containers)
    }

    fn with_containers(
        store: Arc<dyn KeyValueStore>,
        containers: Vec<Container>,
    ) -> Result<Self, InventoryError> {
        let activity = ActivityLog::load(store.clone())?;
        let (events, _) = broadcast::channel(64);
        Ok(Self {
            store,
            containers,
            activity,
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.events.subscribe()
    }

    pub fn all(&self) -> &[Container] {
        &self.containers
    }

    pub fn get(&self, id: u32) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn activity_mut(&mut self) -> &mut ActivityLog {
        &mut self.activity
    }

    /// Apply a partial edit. Returns the labels of the fields that changed;
    /// an edit that changes nothing is not persisted or logged.
    pub fn update(
        &mut self,
        id: u32,
        update: &ContainerUpdate,
    ) -> Result<Vec<&'static str>, InventoryError> {
        let index = self
            .containers
            .iter()
            .position(|c| c.id == id)
            .ok_or(InventoryError::ContainerNotFound { id })?;

        let mut edited = self.containers[index].clone();
        let changes = edited.apply(update);
        if changes.is_empty() {
            debug!(id, "Edit left container unchanged");
            return Ok(changes);
        }
        let action = describe_update(&changes, &edited.name);

        let mut containers = self.containers.clone();
        containers[index] = edited;
        self.commit(containers)?;
        info!(id, fields = ?changes, "Updated container");
        self.record(action, change_icon(&changes));
        self.notify(InventoryEvent::Updated { id });
        Ok(changes)
    }

    pub fn add(&mut self, container: Container) -> Result<(), InventoryError> {
        if self.get(container.id).is_some() {
            return Err(InventoryError::DuplicateId { id: container.id });
        }
        let id = container.id;
        let action = format!("Added new container {}", container.name);

        let mut containers = self.containers.clone();
        containers.push(container);
        self.commit(containers)?;
        info!(id, "Added container");
        self.record(action, "plus.circle");
        self.notify(InventoryEvent::Added { id });
        Ok(())
    }

    pub fn remove(&mut self, id: u32) -> Result<Container, InventoryError> {
        let index = self
            .containers
            .iter()
            .position(|c| c.id == id)
            .ok_or(InventoryError::ContainerNotFound { id })?;

        let mut containers = self.containers.clone();
        let removed = containers.remove(index);
        self.commit(containers)?;
        info!(id, "Removed container");
        self.record(format!("Removed container {}", removed.name), "minus.circle");
        self.notify(InventoryEvent::Removed { id });
        Ok(removed)
    }

    /// Discard every edit and reload the bundled catalog.
    pub fn reset_to_default(&mut self) -> Result<(), InventoryError> {
        self.commit(bundled_catalog()?)?;
        info!(count = self.containers.len(), "Reset containers to bundled catalog");
        self.notify(InventoryEvent::Reset);
        Ok(())
    }

    /// Save `containers`, then adopt them. On a failed write the in-memory
    /// list keeps matching what is on disk.
    fn commit(&mut self, containers: Vec<Container>) -> Result<(), InventoryError> {
        set_typed(self.store.as_ref(), CONTAINERS_KEY, &containers)?;
        self.containers = containers;
        Ok(())
    }

    // The edit itself is already saved; a feed write failure must not undo it.
    fn record(&mut self, action: String, icon: &str) {
        if let Err(e) = self.activity.record(action, icon) {
            warn!(error = %e, "Failed to record activity");
        }
    }

    fn notify(&self, event: InventoryEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// `"Updated temperature, pH level and volume for Tank A1"`.
pub fn describe_update(changes: &[&str], name: &str) -> String {
    let text = match changes {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    };
    format!("Updated {} for {}", text, name)
}

/// Icon for an edit, by the most significant field touched.
pub fn change_icon(changes: &[&str]) -> &'static str {
    let touched = |field: &str| changes.iter().any(|c| *c == field);
    if touched(FIELD_TEMPERATURE) {
        "thermometer"
    } else if touched(FIELD_PH) {
        "drop"
    } else if touched(FIELD_VOLUME) || touched(FIELD_CAPACITY) {
        "chart.bar"
    } else if touched(FIELD_STATUS) {
        "flask"
    } else if touched(FIELD_LOCATION) {
        "location"
    } else {
        "pencil"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::inventory::container::{ContainerStatus, FIELD_NAME};
    use crate::store::MemoryStore;
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: PathBuf::from("defaults.json"),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn manager() -> (InventoryManager, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (InventoryManager::load(store.clone()).unwrap(), store)
    }

    fn new_container(id: u32) -> Container {
        let mut c = bundled_catalog().unwrap().remove(0);
        c.id = id;
        c.name = format!("Extra Tank {}", id);
        c
    }

    #[test]
    fn test_seeds_from_catalog_and_persists() {
        let (manager, store) = manager();
        assert_eq!(manager.all(), bundled_catalog().unwrap().as_slice());
        let saved: Option<Vec<Container>> = get_typed(store.as_ref(), CONTAINERS_KEY).unwrap();
        assert_eq!(saved.unwrap().len(), manager.all().len());
    }

    #[test]
    fn test_edits_survive_reload() {
        let (mut manager, store) = manager();
        let update = ContainerUpdate {
            current_volume: Some(10.0),
            ..ContainerUpdate::default()
        };
        manager.update(1, &update).unwrap();

        let reloaded = InventoryManager::load(store).unwrap();
        assert_eq!(reloaded.get(1).unwrap().current_volume, 10.0);
    }

    #[test]
    fn test_undecodable_saved_list_is_kept() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut raw = serde_json::to_value(bundled_catalog().unwrap()).unwrap();
        raw[0]["name"] = Value::from("My Edited Tank");
        raw[1]["status"] = Value::from("Bottled");
        store.set(CONTAINERS_KEY, raw.clone()).unwrap();

        let err = InventoryManager::load(store.clone()).err().unwrap();
        assert!(matches!(
            err,
            InventoryError::Store(StoreError::Decode { ref key, .. }) if key == CONTAINERS_KEY
        ));
        assert_eq!(store.get(CONTAINERS_KEY).unwrap(), Some(raw));

        // an explicit reseed is the way out
        let manager = InventoryManager::from_catalog(store.clone()).unwrap();
        assert_eq!(manager.all(), bundled_catalog().unwrap().as_slice());
        assert!(InventoryManager::load(store).is_ok());
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let flaky = Arc::new(FlakyStore::default());
        let store: Arc<dyn KeyValueStore> = flaky.clone();
        let mut manager = InventoryManager::load(store.clone()).unwrap();
        let before = manager.all().to_vec();
        flaky.fail_writes.store(true, Ordering::SeqCst);

        let update = ContainerUpdate {
            name: Some("Never Saved".to_string()),
            ..ContainerUpdate::default()
        };
        assert!(matches!(
            manager.update(1, &update),
            Err(InventoryError::Store(StoreError::Io { .. }))
        ));
        assert!(manager.add(new_container(100)).is_err());
        assert!(manager.remove(1).is_err());
        assert!(manager.reset_to_default().is_err());

        assert_eq!(manager.all(), before.as_slice());
        assert!(manager.activity().is_empty());
        flaky.fail_writes.store(false, Ordering::SeqCst);
        let reloaded = InventoryManager::load(store).unwrap();
        assert_eq!(reloaded.all(), before.as_slice());
    }

    #[test]
    fn test_update_logs_activity_with_icon() {
        let (mut manager, _) = manager();
        let name = manager.get(1).unwrap().name.clone();
        let update = ContainerUpdate {
            status: Some(ContainerStatus::Ready),
            temperature: Some(9.5),
            location: Some("Tasting Room".to_string()),
            ..ContainerUpdate::default()
        };
        let changes = manager.update(1, &update).unwrap();
        assert_eq!(changes, vec![FIELD_STATUS, FIELD_TEMPERATURE, FIELD_LOCATION]);

        let entry = &manager.activity().all()[0];
        assert_eq!(
            entry.action,
            format!("Updated status, temperature and location for {}", name)
        );
        assert_eq!(entry.icon, "thermometer");
    }

    #[test]
    fn test_noop_update_is_not_logged() {
        let (mut manager, _) = manager();
        let status = manager.get(1).unwrap().status;
        let update = ContainerUpdate {
            status: Some(status),
            ..ContainerUpdate::default()
        };
        assert!(manager.update(1, &update).unwrap().is_empty());
        assert!(manager.activity().is_empty());
    }

    #[test]
    fn test_update_unknown_container() {
        let (mut manager, _) = manager();
        let err = manager.update(999, &ContainerUpdate::default()).unwrap_err();
        assert!(matches!(err, InventoryError::ContainerNotFound { id: 999 }));
    }

    #[test]
    fn test_add_and_remove() {
        let (mut manager, _) = manager();
        let before = manager.all().len();
        manager.add(new_container(100)).unwrap();
        assert_eq!(manager.all().len(), before + 1);
        assert_eq!(
            manager.activity().all()[0].action,
            "Added new container Extra Tank 100"
        );
        assert_eq!(manager.activity().all()[0].icon, "plus.circle");

        let removed = manager.remove(100).unwrap();
        assert_eq!(removed.id, 100);
        assert_eq!(manager.all().len(), before);
        assert_eq!(
            manager.activity().all()[0].action,
            "Removed container Extra Tank 100"
        );
        assert_eq!(manager.activity().all()[0].icon, "minus.circle");
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let (mut manager, _) = manager();
        let err = manager.add(new_container(1)).unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateId { id: 1 }));
    }

    #[test]
    fn test_remove_unknown_container() {
        let (mut manager, _) = manager();
        assert!(matches!(
            manager.remove(404),
            Err(InventoryError::ContainerNotFound { id: 404 })
        ));
    }

    #[test]
    fn test_reset_to_default_discards_edits() {
        let (mut manager, store) = manager();
        manager.add(new_container(100)).unwrap();
        manager.reset_to_default().unwrap();
        assert!(manager.get(100).is_none());

        let reloaded = InventoryManager::load(store).unwrap();
        assert!(reloaded.get(100).is_none());
        // the feed keeps its history across a reset
        assert!(!reloaded.activity().is_empty());
    }

    #[test]
    fn test_mutations_broadcast_events() {
        let (mut manager, _) = manager();
        let mut rx = manager.subscribe();

        manager
            .update(
                2,
                &ContainerUpdate {
                    name: Some("Renamed".to_string()),
                    ..ContainerUpdate::default()
                },
            )
            .unwrap();
        manager.add(new_container(100)).unwrap();
        manager.remove(100).unwrap();
        manager.reset_to_default().unwrap();

        assert_eq!(rx.try_recv().unwrap(), InventoryEvent::Updated { id: 2 });
        assert_eq!(rx.try_recv().unwrap(), InventoryEvent::Added { id: 100 });
        assert_eq!(rx.try_recv().unwrap(), InventoryEvent::Removed { id: 100 });
        assert_eq!(rx.try_recv().unwrap(), InventoryEvent::Reset);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_describe_update() {
        assert_eq!(describe_update(&["name"], "B7"), "Updated name for B7");
        assert_eq!(
            describe_update(&["status", "volume"], "B7"),
            "Updated status and volume for B7"
        );
        assert_eq!(
            describe_update(&["status", "temperature", "pH level", "location"], "B7"),
            "Updated status, temperature, pH level and location for B7"
        );
    }

    #[test]
    fn test_change_icon_priority() {
        assert_eq!(change_icon(&[FIELD_LOCATION, FIELD_TEMPERATURE]), "thermometer");
        assert_eq!(change_icon(&[FIELD_VOLUME, FIELD_PH]), "drop");
        assert_eq!(change_icon(&[FIELD_STATUS, FIELD_CAPACITY]), "chart.bar");
        assert_eq!(change_icon(&[FIELD_LOCATION, FIELD_STATUS]), "flask");
        assert_eq!(change_icon(&[FIELD_LOCATION]), "location");
        assert_eq!(change_icon(&[FIELD_NAME]), "pencil");
    }
}
