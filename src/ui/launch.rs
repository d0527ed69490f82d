use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::watch;

use crate::launch::LaunchState;

/// Loading indicator for a launch.
///
/// Spins while the controller is between `Init` and a terminal state, and
/// again while a web surface reports it is loading.
pub struct LaunchUI {
    style: ProgressStyle,
}

impl Default for LaunchUI {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchUI {
    pub fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.magenta} {msg}")
            .expect("progress bar template is a valid static string");
        Self { style }
    }

    fn spinner(&self, msg: impl Into<String>) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        bar.set_style(self.style.clone());
        bar.set_message(msg.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    /// Render state changes until the launch settles.
    pub async fn follow(&self, mut states: watch::Receiver<LaunchState>) {
        let bar = self.spinner(describe(&states.borrow()));
        loop {
            let state = states.borrow_and_update().clone();
            if state.is_terminal() {
                break;
            }
            bar.set_message(describe(&state));
            if states.changed().await.is_err() {
                break;
            }
        }
        bar.finish_and_clear();
    }

    /// Spin while the web surface is loading. Returns once the flag's sender is dropped.
    pub async fn follow_loading(&self, mut loading: watch::Receiver<bool>) {
        let mut active: Option<ProgressBar> = None;
        loop {
            let is_loading = *loading.borrow_and_update();
            match (is_loading, active.take()) {
                (true, None) => active = Some(self.spinner("Loading page...")),
                (false, Some(bar)) => bar.finish_and_clear(),
                (_, bar) => active = bar,
            }
            if loading.changed().await.is_err() {
                break;
            }
        }
        if let Some(bar) = active {
            bar.finish_and_clear();
        }
    }
}

/// One-line, human-readable description of a launch state.
pub fn describe(state: &LaunchState) -> String {
    match state {
        LaunchState::Init => "Starting...".to_string(),
        LaunchState::CheckingCache => "Checking saved decision...".to_string(),
        LaunchState::CachedRedirect { .. } => "Using saved redirect".to_string(),
        LaunchState::Querying { attempt: 1 } => "Contacting gate...".to_string(),
        LaunchState::Querying { attempt } => {
            format!("Contacting gate... {}", style(format!("(attempt {})", attempt)).dim())
        }
        LaunchState::Redirect { url } => format!("Redirect to {}", url),
        LaunchState::Native => "Native app".to_string(),
    }
}
