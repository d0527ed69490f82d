//! Configuration view and validation commands: `vineyard-gate config`.

use anyhow::Result;
use std::path::Path;

use vineyard_gate::gate_config::{GateConfig, GateToml};
use vineyard_gate::init::get_state_dir;

use super::super::{Cli, ConfigCommands};
use super::load_config;

pub fn cmd_config(project_dir: &Path, cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    let state_dir = get_state_dir(project_dir);
    let config_path = state_dir.join("gate.toml");

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Gate Configuration");
            println!("==================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                GateToml::load(&config_path)?
            } else {
                println!("No gate.toml found at {}", config_path.display());
                println!("Using default configuration:");
                GateToml::default()
            };
            println!();
            print_toml(&toml);

            // Effective values, including env and CLI overrides
            let config = load_config(project_dir, cli)?;
            println!("Effective values (with env/CLI overrides):");
            println!("  endpoint = \"{}\"", config.endpoint);
            println!("  timeout_secs = {}", config.request_timeout.as_secs());
            println!("  retry_delay_ms = {}", config.retry_delay.as_millis());
            println!("  token = \"{}\"", mask(&config.token));
            println!();
            println!("Device (sent with every gate request):");
            println!("  os = \"{}\"", config.device.os_label());
            println!("  language = \"{}\"", config.device.language());
            println!("  country = \"{}\"", config.device.country_code());
            println!("  model = \"{}\"", config.device.model);
            println!();

            if !config_path.exists() {
                println!("Run 'vineyard-gate config init' to create a gate.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No gate.toml found, checking defaults.");
            }
            let gate_config = GateConfig::with_cli_args(
                project_dir.to_path_buf(),
                cli.verbose,
                cli.endpoint.clone(),
                cli.retry_delay_ms,
            )?;
            let warnings = gate_config.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("gate.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !state_dir.exists() {
                std::fs::create_dir_all(&state_dir)?;
            }
            GateToml::default().save(&config_path)?;

            println!("Created gate.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [gate] endpoint, access_code, token, timeout_secs");
            println!("  - [launch] retry_delay_ms, load_timeout_secs, reset_taps");
            println!("  - [policy] allowed_schemes, allowed_hosts");
            println!("  - [device] locale, country, model overrides");
            println!();
        }
    }

    Ok(())
}

fn print_toml(toml: &GateToml) {
    println!("[gate]");
    println!("  endpoint = \"{}\"", toml.gate.endpoint);
    println!("  access_code = \"{}\"", toml.gate.access_code);
    println!("  token = \"{}\"", mask(&toml.gate.token));
    println!("  timeout_secs = {}", toml.gate.timeout_secs);
    println!();

    println!("[launch]");
    println!("  retry_delay_ms = {}", toml.launch.retry_delay_ms);
    println!("  load_timeout_secs = {}", toml.launch.load_timeout_secs);
    println!("  reset_taps = {}", toml.launch.reset_taps);
    println!("  reset_window_ms = {}", toml.launch.reset_window_ms);
    println!();

    println!("[policy]");
    println!("  enabled = {}", toml.policy.enabled);
    println!("  allowed_schemes = {:?}", toml.policy.allowed_schemes);
    println!("  allowed_hosts = {:?}", toml.policy.allowed_hosts);
    println!();
}

/// Keep the first four characters of a secret.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
