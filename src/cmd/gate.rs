//! Gate inspection and maintenance: `vineyard-gate gate`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use std::path::Path;

use vineyard_gate::gate::GateDecision;
use vineyard_gate::store::RedirectCache;
use vineyard_gate::ui::icons::{CHECK, CROSS, GLOBE, HOUSE};

use super::super::{Cli, GateCommands};
use super::load_config;

pub async fn cmd_gate(project_dir: &Path, cli: &Cli, command: &GateCommands) -> Result<()> {
    match command {
        GateCommands::Status => cmd_status(project_dir, cli),
        GateCommands::Reset { force } => cmd_reset(project_dir, cli, *force),
        GateCommands::Probe { send } => cmd_probe(project_dir, cli, *send).await,
    }
}

fn cmd_status(project_dir: &Path, cli: &Cli) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let cache = RedirectCache::new(config.open_store());

    println!();
    println!("Launch Gate Status");
    println!("==================");
    println!();
    println!("Endpoint:    {}", config.endpoint);
    println!(
        "Retry delay: {}ms (unbounded)",
        config.retry_delay.as_millis()
    );
    println!(
        "URL policy:  {}",
        if config.policy.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();

    match cache.load() {
        Ok(Some(url)) => {
            println!("{}Saved redirect: {}", GLOBE, style(&url).cyan());
            println!("  Every launch opens this URL without contacting the gate.");
        }
        Ok(None) => {
            println!("{}No saved redirect", HOUSE);
            println!("  The next launch will ask the gate.");
        }
        Err(e) => {
            println!("{}Saved decision unreadable: {}", CROSS, e);
            println!("  The next launch will ask the gate.");
        }
    }
    println!();
    Ok(())
}

fn cmd_reset(project_dir: &Path, cli: &Cli, force: bool) -> Result<()> {
    let config = load_config(project_dir, cli)?;

    if !force {
        let confirm = Confirm::new()
            .with_prompt("Forget the saved redirect and ask the gate again on next launch?")
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            println!("Reset cancelled");
            return Ok(());
        }
    }

    RedirectCache::new(config.open_store())
        .clear()
        .context("Failed to clear saved redirect")?;
    println!("{}Saved redirect cleared", CHECK);
    Ok(())
}

/// Show the request a launch would send. With `send`, perform exactly one
/// round-trip and report the verdict without saving it.
async fn cmd_probe(project_dir: &Path, cli: &Cli, send: bool) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let client = config.gate_client()?;
    let url = client.build_request();

    println!();
    println!("Request URL:");
    println!("  {}", url);
    println!();
    println!("Parameters:");
    for (name, value) in client.request().params() {
        println!("  {:<12} {}", name, value);
    }
    println!();

    if !send {
        return Ok(());
    }

    let raw = client.send(&url).await.context("Gate request failed")?;
    match client.validate(&raw) {
        Ok(GateDecision::Redirect(target)) if target.is_empty() => {
            println!("{}Gate answered with an empty redirect: native app", HOUSE)
        }
        Ok(GateDecision::Redirect(target)) => match config.policy.check(&target) {
            Ok(()) => println!("{}Gate answered: redirect to {}", GLOBE, style(target).cyan()),
            Err(violation) => println!(
                "{}Gate answered with a redirect the URL policy rejects ({}): native app",
                HOUSE, violation
            ),
        },
        Ok(GateDecision::ShowNative) => println!("{}Gate answered: native app", HOUSE),
        Err(reason) => println!(
            "{}Untrusted response ({}): native app",
            HOUSE,
            style(reason).yellow()
        ),
    }
    println!("{}", style("(probe only, nothing was saved)").dim());
    println!();
    Ok(())
}
