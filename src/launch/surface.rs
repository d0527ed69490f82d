//! Presentation surfaces and the loading indicator.
//!
//! The controller only decides *which* surface to show. A [`Presenter`] shows
//! it; the web surface reports back through [`LoadEvent`]s, which
//! [`LoadTracker`] folds into a single "loading" flag with a hard timeout.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::launch::controller::Presentation;

/// Page-load signal emitted by a web surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Started,
    Finished,
    Failed(String),
}

/// Shows the chosen surface.
pub trait Presenter: Send + Sync {
    fn present_native(&self);

    /// Open `url`; load progress is reported on `events`.
    fn present_web(&self, url: &str, events: mpsc::Sender<LoadEvent>);
}

/// Hand a presentation to `presenter`, returning the load-event receiver for web surfaces.
pub fn present(
    presenter: &dyn Presenter,
    presentation: &Presentation,
) -> Option<mpsc::Receiver<LoadEvent>> {
    match presentation {
        Presentation::Native => {
            presenter.present_native();
            None
        }
        Presentation::Web(url) => {
            let (tx, rx) = mpsc::channel(16);
            presenter.present_web(url, tx);
            Some(rx)
        }
    }
}

/// Drives a loading flag from [`LoadEvent`]s.
///
/// `Started` raises the flag and arms the timeout; `Finished`/`Failed` lower
/// it. If the timeout elapses first the flag is forced down anyway.
pub struct LoadTracker {
    timeout: Duration,
    loading_tx: watch::Sender<bool>,
}

impl LoadTracker {
    pub fn new(timeout: Duration) -> Self {
        let (loading_tx, _) = watch::channel(false);
        Self {
            timeout,
            loading_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading_tx.borrow()
    }

    /// Consume events until the sender side closes.
    pub async fn track(&self, mut events: mpsc::Receiver<LoadEvent>) {
        let mut deadline: Option<Instant> = None;

        loop {
            let armed = deadline;
            let timeout = async move {
                match armed {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = events.recv() => match event {
                    Some(LoadEvent::Started) => {
                        debug!("Web surface started loading");
                        deadline = Some(Instant::now() + self.timeout);
                        self.loading_tx.send_replace(true);
                    }
                    Some(LoadEvent::Finished) => {
                        debug!("Web surface finished loading");
                        deadline = None;
                        self.loading_tx.send_replace(false);
                    }
                    Some(LoadEvent::Failed(reason)) => {
                        warn!(%reason, "Web surface failed to load");
                        deadline = None;
                        self.loading_tx.send_replace(false);
                    }
                    None => break,
                },
                _ = timeout => {
                    warn!(timeout_secs = self.timeout.as_secs(), "No load finish signal, clearing loading indicator");
                    deadline = None;
                    self.loading_tx.send_replace(false);
                }
            }
        }
    }
}
