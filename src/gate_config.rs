//! Unified configuration for the launch gate.
//!
//! Settings are read from `.vineyard/gate.toml` and layered file → environment → CLI.
//! Every field has a default, so a missing file is a valid configuration.
//!
//! # Configuration File Format
//!
//! ```toml
//! [gate]
//! endpoint = "https://gate.example.com/server.php?p=ACCESS&os=OS_SYSTEM"
//! access_code = "Bs2675kDjkb5Ga"
//! token = "shared-secret"
//! timeout_secs = 30
//!
//! [launch]
//! retry_delay_ms = 2000
//! load_timeout_secs = 10
//! reset_taps = 5
//! reset_window_ms = 3000
//!
//! [policy]
//! enabled = true
//! allowed_schemes = ["https"]
//! allowed_hosts = ["app.example.com"]
//!
//! [device]
//! locale = "fr-CA"
//! country = "CA"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gate::request::parse_endpoint;
use crate::init::STATE_DIR;

/// Compiled-in gate endpoint. Placeholder values in the query are overwritten
/// by the request builder.
pub const DEFAULT_ENDPOINT: &str = "https://gate.example.com/server.php?p=ACCESS_CODE&os=OS_SYSTEM&lng=LANGUAGE_SYSTEM&devicemodel=DEVICE_MODEL&country=COUNTRY";
pub const DEFAULT_ACCESS_CODE: &str = "Bs2675kDjkb5Ga";
pub const DEFAULT_TOKEN: &str = "GJDFHDFHFDJGSDAGKGHK";

pub const ENV_ENDPOINT: &str = "VINEYARD_GATE_ENDPOINT";
pub const ENV_TOKEN: &str = "VINEYARD_GATE_TOKEN";
pub const ENV_ACCESS_CODE: &str = "VINEYARD_ACCESS_CODE";
pub const ENV_TIMEOUT_SECS: &str = "VINEYARD_GATE_TIMEOUT_SECS";

/// Remote gate endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_access_code")]
    pub access_code: String,
    /// Shared secret a response must start with before its URL is trusted
    #[serde(default = "default_token")]
    pub token: String,
    /// Transport timeout for one gate request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_access_code() -> String {
    DEFAULT_ACCESS_CODE.to_string()
}

fn default_token() -> String {
    DEFAULT_TOKEN.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            access_code: default_access_code(),
            token: default_token(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Launch controller timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSection {
    /// Fixed delay between failed gate attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Loading indicator is forced off after this long without a finish signal
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
    /// Taps needed to trigger the hidden reset
    #[serde(default = "default_reset_taps")]
    pub reset_taps: usize,
    #[serde(default = "default_reset_window_ms")]
    pub reset_window_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_load_timeout_secs() -> u64 {
    10
}

fn default_reset_taps() -> usize {
    5
}

fn default_reset_window_ms() -> u64 {
    3000
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            load_timeout_secs: default_load_timeout_secs(),
            reset_taps: default_reset_taps(),
            reset_window_ms: default_reset_window_ms(),
        }
    }
}

/// Optional allow-list applied to redirect URLs. Off unless `enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,
    /// Empty means any host
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["https".to_string()]
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_schemes: default_allowed_schemes(),
            allowed_hosts: Vec::new(),
        }
    }
}

/// Overrides for detected device metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
}

/// The complete gate.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateToml {
    #[serde(default)]
    pub gate: GateSection,
    #[serde(default)]
    pub launch: LaunchSection,
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub device: DeviceSection,
}

impl GateToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse gate.toml")
    }

    /// Load from `<state_dir>/gate.toml`, or defaults if the file doesn't exist.
    pub fn load_or_default(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join("gate.toml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize gate.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Endpoint, with environment override.
    pub fn endpoint(&self) -> String {
        std::env::var(ENV_ENDPOINT)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.gate.endpoint.clone())
    }

    /// Validation token, with environment override.
    pub fn token(&self) -> String {
        std::env::var(ENV_TOKEN)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.gate.token.clone())
    }

    /// Access code, with environment override.
    pub fn access_code(&self) -> String {
        std::env::var(ENV_ACCESS_CODE)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.gate.access_code.clone())
    }

    /// Request timeout, with environment override. Unparseable values fall back to the file.
    pub fn timeout_secs(&self) -> u64 {
        std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.gate.timeout_secs)
    }

    /// Validate the configuration, with environment overrides applied, and
    /// return any warnings.
    pub fn validate(&self) -> Vec<String> {
        self.validate_resolved(&self.endpoint(), self.launch.retry_delay_ms)
    }

    /// Validate against an endpoint and retry delay already resolved from
    /// every layer.
    pub fn validate_resolved(&self, endpoint: &str, retry_delay_ms: u64) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Err(e) = parse_endpoint(endpoint) {
            warnings.push(e.to_string());
        }
        if self.token().is_empty() {
            warnings.push("Empty token: any response of the form '#<url>' will be trusted".to_string());
        }
        if self.timeout_secs() == 0 {
            warnings.push("timeout_secs = 0: requests will fail immediately".to_string());
        }
        if retry_delay_ms == 0 {
            warnings.push("retry_delay_ms = 0: failed requests will be retried in a tight loop".to_string());
        }
        if self.launch.reset_taps == 0 {
            warnings.push("reset_taps = 0: the tap reset can never fire".to_string());
        }
        if self.policy.enabled && self.policy.allowed_schemes.is_empty() {
            warnings.push(
                "Policy enabled with no allowed_schemes: every redirect will be rejected"
                    .to_string(),
            );
        }

        warnings
    }
}

/// Configuration for one CLI invocation.
///
/// Merges settings from:
/// 1. gate.toml file
/// 2. Environment variables (`.env` is loaded by the binary before this runs)
/// 3. CLI arguments
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub project_dir: PathBuf,
    /// Path to the .vineyard directory
    pub state_dir: PathBuf,
    pub toml: GateToml,
    pub verbose: bool,
    /// CLI override for the endpoint (if specified)
    pub cli_endpoint: Option<String>,
    /// CLI override for the retry delay (if specified)
    pub cli_retry_delay_ms: Option<u64>,
}

impl GateConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let state_dir = project_dir.join(STATE_DIR);
        let toml = GateToml::load_or_default(&state_dir)?;

        Ok(Self {
            project_dir,
            state_dir,
            toml,
            verbose: false,
            cli_endpoint: None,
            cli_retry_delay_ms: None,
        })
    }

    pub fn with_cli_args(
        project_dir: PathBuf,
        verbose: bool,
        endpoint: Option<String>,
        retry_delay_ms: Option<u64>,
    ) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.verbose = verbose;
        config.cli_endpoint = endpoint;
        config.cli_retry_delay_ms = retry_delay_ms;
        Ok(config)
    }

    /// Endpoint (CLI → env → file → default).
    pub fn endpoint(&self) -> String {
        self.cli_endpoint
            .clone()
            .unwrap_or_else(|| self.toml.endpoint())
    }

    /// Retry delay (CLI → file → default).
    pub fn retry_delay_ms(&self) -> u64 {
        self.cli_retry_delay_ms
            .unwrap_or(self.toml.launch.retry_delay_ms)
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir.join("gate.toml")
    }

    /// Path to the key-value store backing all persisted state.
    pub fn store_file(&self) -> PathBuf {
        self.state_dir.join("defaults.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// Warnings for the effective configuration, CLI overrides included.
    pub fn validate(&self) -> Vec<String> {
        self.toml
            .validate_resolved(&self.endpoint(), self.retry_delay_ms())
    }
}
