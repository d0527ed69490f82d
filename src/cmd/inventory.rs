//! Cellar inventory commands: `vineyard-gate inventory`.

use anyhow::{Context, Result, bail};
use chrono::Local;
use console::style;
use dialoguer::Confirm;
use std::path::Path;
use std::sync::Arc;

use vineyard_gate::inventory::{
    ActivityLog, Container, ContainerStatus, ContainerUpdate, Favorites, FillBand,
    InventoryManager, InventoryStats, format_capacity_with_unit, top_by_fill,
};
use vineyard_gate::store::KeyValueStore;
use vineyard_gate::ui::icons::{BARREL, CHART, CHECK, CLOCK, GRAPE, HEART, activity_icon};

use super::super::{Cli, InventoryCommands};
use super::load_config;

pub fn cmd_inventory(project_dir: &Path, cli: &Cli, command: &InventoryCommands) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let store = config.open_store();

    match command {
        InventoryCommands::List { favorites } => {
            let manager = load_inventory(store.clone())?;
            let liked = Favorites::load(store)?;
            let containers: Vec<&Container> = if *favorites {
                liked.liked_from(manager.all())
            } else {
                manager.all().iter().collect()
            };
            print_list(&containers, &liked);
        }
        InventoryCommands::Show { id } => {
            let manager = load_inventory(store.clone())?;
            let liked = Favorites::load(store)?;
            let container = manager
                .get(*id)
                .with_context(|| format!("Container {} not found", id))?;
            print_details(container, liked.is_liked(*id));
        }
        InventoryCommands::Edit {
            id,
            name,
            status,
            volume,
            capacity,
            location,
            temperature,
            ph,
        } => {
            let update = ContainerUpdate {
                name: name.clone(),
                status: *status,
                current_volume: *volume,
                capacity: *capacity,
                location: location.clone(),
                temperature: *temperature,
                ph: *ph,
            };
            if update.is_empty() {
                bail!("Nothing to change. Pass at least one field flag, see --help.");
            }

            let mut manager = load_inventory(store)?;
            let changes = manager.update(*id, &update)?;
            if changes.is_empty() {
                println!("No changes to container {}", id);
            } else {
                println!("{}Updated {} for container {}", CHECK, changes.join(", "), id);
            }
        }
        InventoryCommands::Add { file } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let container: Container = serde_json::from_str(&content)
                .with_context(|| format!("Invalid container JSON in {}", file.display()))?;
            let (id, name) = (container.id, container.name.clone());

            let mut manager = load_inventory(store)?;
            manager.add(container)?;
            println!("{}Added container {} ({})", CHECK, id, name);
        }
        InventoryCommands::Remove { id } => {
            let mut manager = load_inventory(store)?;
            let removed = manager.remove(*id)?;
            println!("{}Removed container {} ({})", CHECK, removed.id, removed.name);
        }
        InventoryCommands::Reset { force } => {
            if !*force {
                let confirm = Confirm::new()
                    .with_prompt("Discard all container edits and restore the bundled catalog?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirm {
                    println!("Reset cancelled");
                    return Ok(());
                }
            }
            let manager = InventoryManager::from_catalog(store)?;
            println!("{}Restored {} containers", CHECK, manager.all().len());
        }
        InventoryCommands::Like { id } => {
            let manager = load_inventory(store.clone())?;
            let container = manager
                .get(*id)
                .with_context(|| format!("Container {} not found", id))?;
            let mut liked = Favorites::load(store)?;
            if liked.toggle(*id)? {
                println!("{}Added {} to favorites", HEART, container.name);
            } else {
                println!("Removed {} from favorites", container.name);
            }
        }
        InventoryCommands::Stats { top } => {
            let manager = load_inventory(store.clone())?;
            let liked = Favorites::load(store)?;
            print_stats(manager.all(), liked.count(), *top);
        }
        InventoryCommands::Activity { limit, clear } => {
            let mut log = ActivityLog::load(store)?;
            if *clear {
                log.clear()?;
                println!("{}Activity cleared", CHECK);
                return Ok(());
            }
            print_activity(&log, *limit);
        }
    }

    Ok(())
}

fn load_inventory(store: Arc<dyn KeyValueStore>) -> Result<InventoryManager> {
    InventoryManager::load(store).context(
        "Failed to load saved containers. Run 'vineyard-gate inventory reset' to restore the bundled catalog.",
    )
}

fn print_list(containers: &[&Container], liked: &Favorites) {
    println!();
    if containers.is_empty() {
        println!("No containers.");
        println!();
        return;
    }

    println!(
        "{:<4} {:<22} {:<12} {:>10} {:>6}  Location",
        "ID", "Name", "Status", "Volume", "Fill"
    );
    println!(
        "{:<4} {:<22} {:<12} {:>10} {:>6}  --------",
        "--", "----", "------", "------", "----"
    );
    for c in containers {
        let marker = if liked.is_liked(c.id) { "*" } else { " " };
        println!(
            "{:<4} {:<22} {:<12} {:>10} {:>5.0}%  {}{}",
            c.id,
            truncate(&c.name, 22),
            status_style(c.status),
            format_capacity_with_unit(c.current_volume),
            c.fill_percentage(),
            c.location,
            marker
        );
    }
    println!();
    println!("{} containers", containers.len());
    println!();
}

fn print_details(c: &Container, liked: bool) {
    println!();
    println!(
        "{}{}{}",
        BARREL,
        style(&c.name).bold(),
        if liked { " *" } else { "" }
    );
    println!("  ID:          {}", c.id);
    println!("  Type:        {}", c.kind);
    println!("  Status:      {}", status_style(c.status));
    println!("  Location:    {}", c.location);
    println!(
        "  Volume:      {} / {} ({:.1}%, {})",
        format_capacity_with_unit(c.current_volume),
        format_capacity_with_unit(c.capacity),
        c.fill_percentage(),
        FillBand::from_percentage(c.fill_percentage()).label()
    );
    println!("  Temperature: {:.1}°C", c.temperature);
    match c.ph {
        Some(ph) => println!("  pH:          {:.2}", ph),
        None => println!("  pH:          -"),
    }
    if let Some(variety) = &c.grape_variety {
        println!("  {}Variety:   {}", GRAPE, variety);
    }
    if let Some(harvest) = &c.harvest_date {
        println!("  Harvested:   {}", harvest);
    }
    println!(
        "  Coordinates: {:.4}, {:.4}",
        c.coordinates.latitude, c.coordinates.longitude
    );
    println!();
}

fn print_stats(containers: &[Container], favorites: usize, top: usize) {
    let stats = InventoryStats::from_containers(containers);

    println!();
    println!("{}Cellar Overview", CHART);
    println!("  Total:      {}", stats.total);
    println!("  Active:     {}", style(stats.active).green());
    println!("  Idle:       {}", style(stats.idle).dim());
    println!("  Favorites:  {}", favorites);
    println!(
        "  Volume:     {} of {}",
        format_capacity_with_unit(stats.total_volume),
        format_capacity_with_unit(stats.total_capacity)
    );
    println!();

    println!("Fullest containers:");
    for c in top_by_fill(containers, top) {
        let fill = c.fill_percentage();
        let band = FillBand::from_percentage(fill);
        let pct = format!("{:>5.1}%", fill);
        let pct = match band {
            FillBand::Low => style(pct).green(),
            FillBand::Moderate => style(pct).yellow(),
            FillBand::High => style(pct).color256(208),
            FillBand::Critical => style(pct).red(),
        };
        println!(
            "  {} {:<22} {}",
            pct,
            truncate(&c.name, 22),
            format_capacity_with_unit(c.capacity)
        );
    }
    println!();
}

fn print_activity(log: &ActivityLog, limit: usize) {
    println!();
    if log.is_empty() {
        println!("No recent activity.");
        println!();
        return;
    }

    println!("{}Recent activity", CLOCK);
    for entry in log.recent(limit) {
        println!(
            "  {}{}  {}",
            activity_icon(&entry.icon),
            entry.action,
            style(entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")).dim()
        );
    }
    println!();
}

fn status_style(status: ContainerStatus) -> console::StyledObject<&'static str> {
    let label = status.as_str();
    if status.is_active() {
        style(label).green()
    } else if status.is_idle() {
        style(label).dim()
    } else {
        style(label).yellow()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
