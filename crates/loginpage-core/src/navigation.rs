//! Page navigation.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::{info, warn};

/// Where a successful login sends the user.
pub const DASHBOARD_PAGE: &str = "dashboard.html";

/// Performs a full navigation to a relative target.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Navigator that forwards targets to whoever owns the receiving end,
/// typically the front end's event loop.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, target: &str) {
        info!(page = target, "Navigating");
        if self.tx.send(target.to_string()).is_err() {
            warn!(page = target, "Navigation receiver dropped");
        }
    }
}

/// Navigator that only records targets. Useful for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(target.to_string());
        }
    }
}
