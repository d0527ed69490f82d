//! `vineyard-gate launch`: run the launch gate once, optionally staying up
//! to listen for the hidden reset.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use vineyard_gate::config::Config;
use vineyard_gate::gate::GateTransport;
use vineyard_gate::launch::{LaunchController, Presentation, Presenter, present};
use vineyard_gate::ui::icons::RESET;
use vineyard_gate::ui::{ConsolePresenter, LaunchUI};

use super::super::Cli;
use super::load_config;

pub async fn cmd_launch(project_dir: &Path, cli: &Cli, open_browser: bool, watch: bool) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let controller = config.launch_controller(config.open_store())?;
    let presenter = ConsolePresenter::new(open_browser);
    let ui = LaunchUI::new();

    let states = controller.subscribe();
    let (presentation, ()) = tokio::join!(controller.run(), ui.follow(states));
    info!(attempts = controller.attempts(), "Launch settled");
    show(&config, &presenter, &ui, &presentation).await;

    if watch {
        watch_for_reset(&config, &controller, &presenter, &ui).await?;
    }
    Ok(())
}

/// Each empty line on stdin counts as a tap; enough taps in the window
/// clear the saved decision and launch again. Returns at end of input.
async fn watch_for_reset<T: GateTransport>(
    config: &Config,
    controller: &LaunchController<T>,
    presenter: &dyn Presenter,
    ui: &LaunchUI,
) -> Result<()> {
    println!("{}", style("Watching stdin, Ctrl-D to exit").dim());

    let mut taps = config.tap_reset();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if !line.trim().is_empty() || !taps.tap(Instant::now()) {
            continue;
        }

        println!("{}Resetting launch gate", RESET);
        let states = controller.subscribe();
        let (result, ()) = tokio::join!(controller.reset(), ui.follow(states));
        let presentation = result.context("Failed to reset launch gate")?;
        show(config, presenter, ui, &presentation).await;
    }
    Ok(())
}

/// Present the surface and, for web surfaces, spin until the page reports
/// it loaded (or the load timeout passes).
async fn show(config: &Config, presenter: &dyn Presenter, ui: &LaunchUI, presentation: &Presentation) {
    let Some(events) = present(presenter, presentation) else {
        return;
    };

    let tracker = config.load_tracker();
    let loading = tracker.subscribe();
    // Dropping the tracker at the end closes the flag and releases the UI.
    let tracking = async move { tracker.track(events).await };
    tokio::join!(tracking, ui.follow_loading(loading));
}
