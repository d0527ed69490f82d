use anyhow::Result;
use console::style;
use std::path::Path;

use vineyard_gate::init::init_project;
use vineyard_gate::ui::icons::CHECK;

pub fn cmd_init(project_dir: &Path) -> Result<()> {
    let result = init_project(project_dir)?;

    println!();
    if result.created {
        println!(
            "{}Initialized {}",
            CHECK,
            style(result.state_dir.display()).bold()
        );
    } else {
        println!(
            "{} already exists, filled in anything missing",
            result.state_dir.display()
        );
    }
    println!();
    println!("  gate.toml      endpoint, token, retry and device settings");
    println!("  defaults.json  saved redirect, containers, favorites and activity");
    println!("  logs/          daily trace logs");
    println!();
    Ok(())
}
