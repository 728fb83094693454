//! One-shot status view driven by a single health fetch.
//!
//! A panel starts `Unchecked`. Mounting it switches to `Loading` and spawns
//! the fetch; the task publishes exactly one terminal state, `Success` or
//! `Error`. There is no way back to `Loading` short of creating a new panel.
//! Dropping the panel while the fetch is in flight does not cancel it; the
//! late result is simply discarded.

use std::fmt;
use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{ClientError, StatusClient};
use crate::model::HealthStatus;

pub const LOADING_MESSAGE: &str = "Checking system health...";
pub const FAILURE_MESSAGE: &str = "Failed to connect to backend API";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    Unchecked,
    Loading,
    Success(HealthStatus),
    /// Detail is deliberately dropped; only the fixed message is shown
    Error,
}

impl StatusView {
    pub fn is_settled(&self) -> bool {
        matches!(self, StatusView::Success(_) | StatusView::Error)
    }

    /// Short state name, used by templates
    pub fn name(&self) -> &'static str {
        match self {
            StatusView::Unchecked => "unchecked",
            StatusView::Loading => "loading",
            StatusView::Success(_) => "success",
            StatusView::Error => "error",
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Nothing has been fetched yet either way
            StatusView::Unchecked | StatusView::Loading => f.write_str(LOADING_MESSAGE),
            StatusView::Success(health) => write!(
                f,
                "API Status: {}\nDatabase: {}\nTimestamp: {}",
                health.status, health.database, health.timestamp
            ),
            StatusView::Error => f.write_str(FAILURE_MESSAGE),
        }
    }
}

pub struct StatusPanel {
    view: watch::Receiver<StatusView>,
    /// Present until the panel is mounted
    pending: Option<watch::Sender<StatusView>>,
}

impl Default for StatusPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPanel {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(StatusView::Unchecked);
        Self {
            view: rx,
            pending: Some(tx),
        }
    }

    /// Start the health fetch through `client`. Returns `None` if already mounted.
    pub fn mount(&mut self, client: StatusClient) -> Option<JoinHandle<bool>> {
        self.mount_with(async move { client.fetch_health().await })
    }

    /// Start the one-shot task resolving `fetch`. Returns `None` if already mounted.
    ///
    /// The task yields `true` when its result reached the panel and `false`
    /// when the panel was dropped first. Must be called within a Tokio runtime.
    pub fn mount_with<F>(&mut self, fetch: F) -> Option<JoinHandle<bool>>
    where
        F: Future<Output = Result<HealthStatus, ClientError>> + Send + 'static,
    {
        let tx = self.pending.take()?;

        tx.send_replace(StatusView::Loading);
        let task = tokio::spawn(async move {
            let next = match fetch.await {
                Ok(health) => StatusView::Success(health),
                Err(e) => {
                    tracing::debug!(error = %e, "Health fetch failed");
                    StatusView::Error
                }
            };
            if tx.send(next).is_err() {
                tracing::debug!("Status panel unmounted, discarding health result");
                return false;
            }
            true
        });
        Some(task)
    }

    /// Current state.
    pub fn view(&self) -> StatusView {
        self.view.borrow().clone()
    }

    /// Wait for the terminal state. An unmounted panel returns immediately.
    pub async fn settled(&mut self) -> StatusView {
        if self.pending.is_some() {
            return self.view();
        }
        match self.view.wait_for(StatusView::is_settled).await {
            Ok(view) => view.clone(),
            // fetch task died before publishing
            Err(_) => StatusView::Error,
        }
    }
}
