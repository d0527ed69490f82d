//! State directory bootstrap.
//!
//! `vineyard-gate init` creates the `.vineyard/` directory in a project:
//!
//! ```text
//! .vineyard/
//! ├── gate.toml        # Gate, launch and device configuration
//! ├── defaults.json    # Key-value store (cached redirect, containers, favorites, activity)
//! └── logs/            # Daily-rolling trace logs
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::gate_config::GateToml;

/// The name of the state directory.
pub const STATE_DIR: &str = ".vineyard";

/// Result of initializing a state directory.
#[derive(Debug)]
pub struct InitResult {
    pub state_dir: PathBuf,
    /// Whether the directory was newly created (false if it already existed)
    pub created: bool,
}

/// Initialize the state directory in `project_dir`.
///
/// Idempotent: an existing directory has any missing pieces filled in and an
/// existing `gate.toml` is left untouched.
pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let state_dir = project_dir.join(STATE_DIR);
    let created = !state_dir.exists();

    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("Failed to create directory: {}", state_dir.display()))?;
    ensure_directory_structure(&state_dir)?;

    Ok(InitResult { state_dir, created })
}

fn ensure_directory_structure(state_dir: &Path) -> Result<()> {
    let log_dir = state_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let config_file = state_dir.join("gate.toml");
    if !config_file.exists() {
        GateToml::default().save(&config_file)?;
    }

    let store_file = state_dir.join("defaults.json");
    if !store_file.exists() {
        std::fs::write(&store_file, "{}")
            .with_context(|| format!("Failed to create store: {}", store_file.display()))?;
    }

    Ok(())
}

pub fn is_initialized(project_dir: &Path) -> bool {
    project_dir.join(STATE_DIR).exists()
}

pub fn get_state_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(STATE_DIR)
}
