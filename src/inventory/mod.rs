//! Cellar inventory: containers, favorites, activity feed and statistics.
//!
//! All state lives in the shared [`KeyValueStore`](crate::store::KeyValueStore)
//! under fixed keys, next to the cached gate redirect.

pub mod activity;
pub mod container;
pub mod favorites;
pub mod manager;
pub mod stats;

pub use activity::{ActivityEntry, ActivityLog, DEFAULT_RECENT_LIMIT, MAX_ACTIVITIES};
pub use container::{
    Container, ContainerStatus, ContainerUpdate, Coordinates, bundled_catalog, parse_catalog,
};
pub use favorites::Favorites;
pub use manager::{InventoryEvent, InventoryManager};
pub use stats::{
    DEFAULT_TOP_LIMIT, FillBand, InventoryStats, format_capacity, format_capacity_with_unit,
    top_by_fill,
};
