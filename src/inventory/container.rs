use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::InventoryError;

const BUNDLED_CATALOG: &str = include_str!("../../data/containers.json");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Lifecycle stage of a tank or barrel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerStatus {
    Active,
    Fermenting,
    Aging,
    Clarifying,
    Ready,
    Empty,
    Maintenance,
}

impl ContainerStatus {
    pub const ALL: [ContainerStatus; 7] = [
        ContainerStatus::Active,
        ContainerStatus::Fermenting,
        ContainerStatus::Aging,
        ContainerStatus::Clarifying,
        ContainerStatus::Ready,
        ContainerStatus::Empty,
        ContainerStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Active => "Active",
            ContainerStatus::Fermenting => "Fermenting",
            ContainerStatus::Aging => "Aging",
            ContainerStatus::Clarifying => "Clarifying",
            ContainerStatus::Ready => "Ready",
            ContainerStatus::Empty => "Empty",
            ContainerStatus::Maintenance => "Maintenance",
        }
    }

    /// Wine is in the container and work is ongoing.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ContainerStatus::Active | ContainerStatus::Fermenting | ContainerStatus::Aging
        )
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ContainerStatus::Empty | ContainerStatus::Maintenance)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!(
                    "unknown status '{}' (expected one of: {})",
                    wanted,
                    names.join(", ")
                )
            })
    }
}

/// A tank, barrel or other vessel tracked in the cellar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Litres
    pub capacity: f64,
    pub current_volume: f64,
    pub grape_variety: Option<String>,
    pub harvest_date: Option<String>,
    pub status: ContainerStatus,
    pub location: String,
    /// Degrees Celsius
    pub temperature: f64,
    pub ph: Option<f64>,
    pub coordinates: Coordinates,
}

impl Container {
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        self.current_volume / self.capacity * 100.0
    }

    /// Apply `update`, returning the labels of the fields that actually changed.
    pub fn apply(&mut self, update: &ContainerUpdate) -> Vec<&'static str> {
        let mut changed = Vec::new();

        if let Some(name) = &update.name
            && *name != self.name
        {
            self.name = name.clone();
            changed.push(FIELD_NAME);
        }
        if let Some(status) = update.status
            && status != self.status
        {
            self.status = status;
            changed.push(FIELD_STATUS);
        }
        if let Some(temperature) = update.temperature
            && temperature != self.temperature
        {
            self.temperature = temperature;
            changed.push(FIELD_TEMPERATURE);
        }
        if let Some(ph) = update.ph
            && Some(ph) != self.ph
        {
            self.ph = Some(ph);
            changed.push(FIELD_PH);
        }
        if let Some(volume) = update.current_volume
            && volume != self.current_volume
        {
            self.current_volume = volume;
            changed.push(FIELD_VOLUME);
        }
        if let Some(capacity) = update.capacity
            && capacity != self.capacity
        {
            self.capacity = capacity;
            changed.push(FIELD_CAPACITY);
        }
        if let Some(location) = &update.location
            && *location != self.location
        {
            self.location = location.clone();
            changed.push(FIELD_LOCATION);
        }

        changed
    }
}

pub const FIELD_NAME: &str = "name";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_TEMPERATURE: &str = "temperature";
pub const FIELD_PH: &str = "pH level";
pub const FIELD_VOLUME: &str = "volume";
pub const FIELD_CAPACITY: &str = "capacity";
pub const FIELD_LOCATION: &str = "location";

/// A partial edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerUpdate {
    pub name: Option<String>,
    pub status: Option<ContainerStatus>,
    pub current_volume: Option<f64>,
    pub capacity: Option<f64>,
    pub location: Option<String>,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
}

impl ContainerUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Catalog {
    containers: Vec<Container>,
}

/// Parse a catalog document of the form `{"containers": [...]}`.
pub fn parse_catalog(json: &str) -> Result<Vec<Container>, InventoryError> {
    let catalog: Catalog = serde_json::from_str(json).map_err(InventoryError::InvalidCatalog)?;
    Ok(catalog.containers)
}

/// The catalog compiled into the binary.
pub fn bundled_catalog() -> Result<Vec<Container>, InventoryError> {
    parse_catalog(BUNDLED_CATALOG)
}
