//! Per-launch decision between the native app and a cached or remote redirect.
//!
//! ```text
//! Init → CheckingCache ─┬─ cached URL ──→ CachedRedirect → Redirect(url)
//!                       └─ none ────────→ Querying { attempt } ─┬─ Redirect(url)   (persisted)
//!                                            ↑                  ├─ Native          (not persisted)
//!                                            └── retry_delay ───┘  on NetworkError
//! ```
//!
//! The retry loop is sequential and unbounded: a launch never ends in an error
//! state, it either presents a surface or keeps loading.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::errors::GateError;
use crate::gate::{GateClient, GateDecision, GateTransport, UrlPolicy};
use crate::store::RedirectCache;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LaunchState {
    Init,
    CheckingCache,
    CachedRedirect { url: String },
    Querying { attempt: u32 },
    Redirect { url: String },
    Native,
}

impl LaunchState {
    /// Whether a surface has been chosen for this launch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchState::Redirect { .. } | LaunchState::Native)
    }
}

/// Which surface to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "surface", content = "url", rename_all = "snake_case")]
pub enum Presentation {
    Native,
    Web(String),
}

pub struct LaunchController<T: GateTransport> {
    client: GateClient<T>,
    cache: RedirectCache,
    policy: UrlPolicy,
    retry_delay: Duration,
    state_tx: watch::Sender<LaunchState>,
    attempts: AtomicU32,
}

impl<T: GateTransport> LaunchController<T> {
    pub fn new(client: GateClient<T>, cache: RedirectCache, retry_delay: Duration) -> Self {
        let (state_tx, _) = watch::channel(LaunchState::Init);
        Self {
            client,
            cache,
            policy: UrlPolicy::permissive(),
            retry_delay,
            state_tx,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn with_policy(mut self, policy: UrlPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &GateClient<T> {
        &self.client
    }

    /// Observe state transitions. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<LaunchState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> LaunchState {
        self.state_tx.borrow().clone()
    }

    /// Network attempts made by the most recent launch.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn transition(&self, state: LaunchState) {
        info!(?state, "Launch state");
        self.state_tx.send_replace(state);
    }

    /// Decide which surface this launch presents.
    pub async fn run(&self) -> Presentation {
        self.attempts.store(0, Ordering::SeqCst);
        self.transition(LaunchState::Init);
        self.transition(LaunchState::CheckingCache);

        match self.cache.load() {
            Ok(Some(url)) => {
                self.transition(LaunchState::CachedRedirect { url: url.clone() });
                self.transition(LaunchState::Redirect { url: url.clone() });
                return Presentation::Web(url);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read cached redirect, querying gate"),
        }

        let decision = self.query_until_decided().await;
        self.settle(decision)
    }

    /// Clear the cached redirect and launch again from `Init`.
    pub async fn reset(&self) -> Result<Presentation, GateError> {
        info!("Resetting launch gate");
        self.cache.clear()?;
        Ok(self.run().await)
    }

    async fn query_until_decided(&self) -> GateDecision {
        loop {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            self.transition(LaunchState::Querying { attempt });

            match self.client.check().await {
                Ok(decision) => return decision,
                Err(e) if e.is_transient() => {
                    warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "Gate request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    warn!(error = %e, "Gate check failed permanently, showing native app");
                    return GateDecision::ShowNative;
                }
            }
        }
    }

    fn settle(&self, decision: GateDecision) -> Presentation {
        let url = match decision {
            GateDecision::Redirect(url) if !url.is_empty() => url,
            GateDecision::Redirect(_) => {
                warn!("Gate returned an empty redirect, showing native app");
                return self.native();
            }
            GateDecision::ShowNative => return self.native(),
        };

        if let Err(violation) = self.policy.check(&url) {
            warn!(%violation, "Redirect rejected by URL policy, showing native app");
            return self.native();
        }

        if let Err(e) = self.cache.save(&url) {
            warn!(error = %e, "Failed to cache redirect; next launch will query again");
        }
        self.transition(LaunchState::Redirect { url: url.clone() });
        Presentation::Web(url)
    }

    fn native(&self) -> Presentation {
        self.transition(LaunchState::Native);
        Presentation::Native
    }
}

/// Shared handle so the controller can be driven from a UI task and a reset task.
pub type SharedController<T> = Arc<LaunchController<T>>;
