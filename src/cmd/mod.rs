//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module      | Commands handled                          |
//! |-------------|-------------------------------------------|
//! | `init`      | `Init`                                    |
//! | `launch`    | `Launch`                                  |
//! | `gate`      | `Gate status / reset / probe`             |
//! | `config`    | `Config show / validate / init`           |
//! | `inventory` | `Inventory list / show / edit / ...`      |

pub mod config;
pub mod gate;
pub mod init;
pub mod inventory;
pub mod launch;

pub use config::cmd_config;
pub use gate::cmd_gate;
pub use init::cmd_init;
pub use inventory::cmd_inventory;
pub use launch::cmd_launch;

use anyhow::Result;
use std::path::Path;
use vineyard_gate::config::Config;

use super::Cli;

/// Resolve runtime configuration with the global CLI overrides applied.
pub(crate) fn load_config(project_dir: &Path, cli: &Cli) -> Result<Config> {
    Config::load(
        project_dir.to_path_buf(),
        cli.verbose,
        cli.endpoint.clone(),
        cli.retry_delay_ms,
    )
}
