//! Cellar-wide figures for the `stats` view.

use serde::Serialize;

use crate::inventory::Container;

pub const DEFAULT_TOP_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub active: usize,
    pub idle: usize,
    pub total_capacity: f64,
    pub total_volume: f64,
}

impl InventoryStats {
    pub fn from_containers(containers: &[Container]) -> Self {
        Self {
            total: containers.len(),
            active: containers.iter().filter(|c| c.status.is_active()).count(),
            idle: containers.iter().filter(|c| c.status.is_idle()).count(),
            total_capacity: containers.iter().map(|c| c.capacity).sum(),
            total_volume: containers.iter().map(|c| c.current_volume).sum(),
        }
    }
}

/// The `limit` fullest containers, fullest first. Ties keep catalog order.
pub fn top_by_fill(containers: &[Container], limit: usize) -> Vec<&Container> {
    let mut sorted: Vec<&Container> = containers.iter().collect();
    sorted.sort_by(|a, b| b.fill_percentage().total_cmp(&a.fill_percentage()));
    sorted.truncate(limit);
    sorted
}

/// `1.5K` from 1000 up, whole litres below.
pub fn format_capacity(litres: f64) -> String {
    if litres >= 1000.0 {
        format!("{:.1}K", litres / 1000.0)
    } else {
        format!("{:.0}", litres)
    }
}

pub fn format_capacity_with_unit(litres: f64) -> String {
    format!("{}L", format_capacity(litres))
}

/// Traffic-light band for a fill percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillBand {
    Low,
    Moderate,
    High,
    Critical,
}

impl FillBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 50.0 {
            FillBand::Low
        } else if percentage < 75.0 {
            FillBand::Moderate
        } else if percentage < 90.0 {
            FillBand::High
        } else {
            FillBand::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FillBand::Low => "low",
            FillBand::Moderate => "moderate",
            FillBand::High => "high",
            FillBand::Critical => "critical",
        }
    }
}
