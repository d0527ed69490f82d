use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::device::DeviceProfile;
use crate::gate::{GateClient, HttpTransport, UrlPolicy};
use crate::gate_config::GateConfig;
use crate::launch::{LaunchController, LoadTracker, TapReset};
use crate::store::{JsonFileStore, KeyValueStore, RedirectCache};

/// Runtime configuration for one process.
///
/// Resolves the layered [`GateConfig`] into typed values and owns the
/// constructors for the long-lived services (store, gate client, launch
/// controller), so each is built once and passed by reference from here.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub store_file: PathBuf,
    pub log_dir: PathBuf,
    pub endpoint: String,
    pub access_code: String,
    pub token: String,
    pub request_timeout: Duration,
    pub retry_delay: Duration,
    pub load_timeout: Duration,
    pub reset_taps: usize,
    pub reset_window: Duration,
    pub policy: UrlPolicy,
    pub device: DeviceProfile,
    pub verbose: bool,
}

impl Config {
    pub fn new(gate_config: &GateConfig) -> Self {
        let toml = &gate_config.toml;
        Self {
            state_dir: gate_config.state_dir.clone(),
            store_file: gate_config.store_file(),
            log_dir: gate_config.log_dir(),
            endpoint: gate_config.endpoint(),
            access_code: toml.access_code(),
            token: toml.token(),
            request_timeout: Duration::from_secs(toml.timeout_secs()),
            retry_delay: Duration::from_millis(gate_config.retry_delay_ms()),
            load_timeout: Duration::from_secs(toml.launch.load_timeout_secs),
            reset_taps: toml.launch.reset_taps,
            reset_window: Duration::from_millis(toml.launch.reset_window_ms),
            policy: UrlPolicy::from_config(&toml.policy),
            device: DeviceProfile::detect(&toml.device),
            verbose: gate_config.verbose,
        }
    }

    /// Load from `project_dir` with CLI overrides.
    pub fn load(
        project_dir: PathBuf,
        verbose: bool,
        endpoint: Option<String>,
        retry_delay_ms: Option<u64>,
    ) -> Result<Self> {
        let gate_config = GateConfig::with_cli_args(project_dir, verbose, endpoint, retry_delay_ms)?;
        Ok(Self::new(&gate_config))
    }

    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(JsonFileStore::new(&self.store_file))
    }

    pub fn gate_client(&self) -> Result<GateClient<HttpTransport>> {
        let transport = HttpTransport::new(self.request_timeout)?;
        GateClient::new(
            &self.endpoint,
            &self.access_code,
            &self.token,
            &self.device,
            transport,
        )
        .context("Failed to configure gate client")
    }

    pub fn launch_controller(
        &self,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<LaunchController<HttpTransport>> {
        Ok(
            LaunchController::new(self.gate_client()?, RedirectCache::new(store), self.retry_delay)
                .with_policy(self.policy.clone()),
        )
    }

    pub fn load_tracker(&self) -> LoadTracker {
        LoadTracker::new(self.load_timeout)
    }

    pub fn tap_reset(&self) -> TapReset {
        TapReset::new(self.reset_taps, self.reset_window)
    }
}
