//! The status line shown under the login form.
//!
//! A `StatusDisplay` holds one message at a time. Success messages hide
//! themselves after `SUCCESS_HIDE_DELAY`; any newer message cancels a pending
//! hide, and a generation counter keeps a hide that is already running from
//! touching a newer message.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::trace;

use crate::schedule::{ScheduledTask, Scheduler};

/// How long a success message stays visible.
pub const SUCCESS_HIDE_DELAY: Duration = Duration::from_millis(3000);

const BASE_CLASS: &str = "message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }

    /// Class list for the element, e.g. `"message error"`
    pub fn class_name(&self) -> String {
        format!("{} {}", BASE_CLASS, self.as_str())
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the status element currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub text: String,
    pub class: String,
    pub kind: Option<MessageKind>,
    pub visible: bool,
}

#[derive(Default)]
struct StatusState {
    snapshot: StatusSnapshot,
    generation: u64,
    pending_hide: Option<ScheduledTask>,
}

#[derive(Clone)]
pub struct StatusDisplay {
    state: Arc<Mutex<StatusState>>,
    scheduler: Scheduler,
}

impl StatusDisplay {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            state: Arc::new(Mutex::new(StatusState::default())),
            scheduler,
        }
    }

    fn lock(state: &Mutex<StatusState>) -> MutexGuard<'_, StatusState> {
        // The state is plain data; a panic mid-update leaves nothing to repair
        state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current message and make it visible.
    pub fn show_message(&self, text: impl Into<String>, kind: MessageKind) {
        let text = text.into();
        let mut state = Self::lock(&self.state);

        state.generation += 1;
        if let Some(pending) = state.pending_hide.take() {
            pending.cancel();
        }

        trace!(%kind, text = %text, "Status message");
        state.snapshot = StatusSnapshot {
            text,
            class: kind.class_name(),
            kind: Some(kind),
            visible: true,
        };

        if kind == MessageKind::Success {
            let generation = state.generation;
            let weak = Arc::downgrade(&self.state);
            state.pending_hide = Some(
                self.scheduler
                    .schedule(SUCCESS_HIDE_DELAY, move || Self::hide_if_current(&weak, generation)),
            );
        }
    }

    fn hide_if_current(state: &Weak<Mutex<StatusState>>, generation: u64) {
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut state = Self::lock(&state);
        if state.generation == generation {
            state.snapshot.visible = false;
            state.pending_hide = None;
        }
    }

    /// Hide the element immediately, keeping its last text.
    pub fn hide(&self) {
        let mut state = Self::lock(&self.state);
        state.generation += 1;
        if let Some(pending) = state.pending_hide.take() {
            pending.cancel();
        }
        state.snapshot.visible = false;
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        Self::lock(&self.state).snapshot.clone()
    }

    /// Text of the message if it is currently visible
    pub fn visible_text(&self) -> Option<String> {
        let state = Self::lock(&self.state);
        state.snapshot.visible.then(|| state.snapshot.text.clone())
    }
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self::new(Scheduler::default())
    }
}
