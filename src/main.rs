use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use vineyard_gate::init::get_state_dir;
use vineyard_gate::inventory::{ContainerStatus, DEFAULT_RECENT_LIMIT, DEFAULT_TOP_LIMIT};

mod cmd;

#[derive(Parser)]
#[command(name = "vineyard-gate")]
#[command(version, about = "Winery inventory tracker with a remote-controlled launch gate")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs on stderr as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Gate endpoint URL. Overrides gate.toml and VINEYARD_GATE_ENDPOINT.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Delay between failed gate attempts. Overrides gate.toml.
    #[arg(long, global = true)]
    pub retry_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the .vineyard state directory
    Init,
    /// Run the launch gate and present the chosen surface
    Launch {
        /// Open a web redirect in the system browser
        #[arg(long)]
        open: bool,
        /// Stay running and read reset taps (empty lines) from stdin
        #[arg(long)]
        watch: bool,
    },
    /// Inspect or reset the launch gate
    Gate {
        #[command(subcommand)]
        command: GateCommands,
    },
    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Manage cellar containers
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum GateCommands {
    /// Show the endpoint and any saved redirect
    Status,
    /// Forget the saved redirect
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show the request a launch would send
    Probe {
        /// Send it once and report the verdict without saving it
        #[arg(long)]
        send: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default gate.toml file
    Init,
}

#[derive(Subcommand, Clone)]
pub enum InventoryCommands {
    /// List containers
    List {
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },
    /// Show one container
    Show { id: u32 },
    /// Edit fields of a container
    Edit {
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<ContainerStatus>,
        /// Current volume in litres
        #[arg(long)]
        volume: Option<f64>,
        /// Capacity in litres
        #[arg(long)]
        capacity: Option<f64>,
        #[arg(long)]
        location: Option<String>,
        /// Degrees Celsius
        #[arg(long)]
        temperature: Option<f64>,
        #[arg(long)]
        ph: Option<f64>,
    },
    /// Add a container from a JSON file
    Add { file: PathBuf },
    /// Remove a container
    Remove { id: u32 },
    /// Restore the bundled catalog
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Toggle a container as favorite
    Like { id: u32 },
    /// Cellar statistics
    Stats {
        /// How many of the fullest containers to show
        #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
        top: usize,
    },
    /// Recent activity
    Activity {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
        /// Clear the feed instead of showing it
        #[arg(long)]
        clear: bool,
    },
}

/// Stderr logging filtered by `RUST_LOG` (else `warn`, `debug` with
/// `--verbose`), plus a daily file log once `.vineyard/logs` exists.
fn init_tracing(cli: &Cli, project_dir: &Path) -> Option<WorkerGuard> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = if cli.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let log_dir = get_state_dir(project_dir).join("logs");
    let (file_layer, guard) = if log_dir.is_dir() {
        let appender = tracing_appender::rolling::daily(&log_dir, "vineyard-gate.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let _log_guard = init_tracing(&cli, &project_dir);

    match &cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Launch { open, watch } => {
            cmd::cmd_launch(&project_dir, &cli, *open, *watch).await?
        }
        Commands::Gate { command } => cmd::cmd_gate(&project_dir, &cli, command).await?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, &cli, command.clone())?,
        Commands::Inventory { command } => cmd::cmd_inventory(&project_dir, &cli, command)?,
    }

    Ok(())
}
