//! The login form controller.
//!
//! `LoginFormController` runs one login attempt per form submission: it shows
//! a progress message, posts the credentials, and on success stores the
//! returned token and schedules navigation to the dashboard. Every collaborator
//! is injected so the whole flow runs without a real UI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::{ApiResponse, LoginApi};
use crate::models::{Credentials, ErrorBody, LoginResponse};
use crate::navigation::{Navigator, DASHBOARD_PAGE};
use crate::schedule::{Clock, ScheduledTask, Scheduler};
use crate::status::{MessageKind, StatusDisplay};
use crate::store::{StoreError, TokenStore, TOKEN_KEY};

// ============================================================================
// Constants
// ============================================================================

pub const LOGGING_IN_MESSAGE: &str = "Logging in...";
pub const SUCCESS_MESSAGE: &str = "Login successful!";
pub const FAILURE_MESSAGE: &str = "Login failed";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Delay between a successful login and navigating to the dashboard.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// A form submission carrying the current field values.
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    credentials: Credentials,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(email, password),
            default_prevented: false,
        }
    }

    /// Stop the host from performing its own submission.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Result of one call to `handle_submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success { token: String },
    /// The server rejected the attempt; `message` is what the user was shown.
    Failure { message: String },
    /// The request or its response could not be completed.
    NetworkError,
    /// Another submission was still in flight; nothing was sent.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Clears the in-flight flag however the submission ends, including when the
/// future is dropped mid-request.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct LoginFormController {
    api: Arc<dyn LoginApi>,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    scheduler: Scheduler,
    status: StatusDisplay,
    in_flight: AtomicBool,
    phase: Mutex<LoginPhase>,
    pending_redirect: Mutex<Option<ScheduledTask>>,
}

impl LoginFormController {
    pub fn new(
        api: Arc<dyn LoginApi>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scheduler = Scheduler::new(clock);
        let status = StatusDisplay::new(scheduler.clone());
        Self {
            api,
            store,
            navigator,
            scheduler,
            status,
            in_flight: AtomicBool::new(false),
            phase: Mutex::new(LoginPhase::Idle),
            pending_redirect: Mutex::new(None),
        }
    }

    /// Handle to the status line this controller writes to.
    pub fn status(&self) -> StatusDisplay {
        self.status.clone()
    }

    pub fn phase(&self) -> LoginPhase {
        *lock(&self.phase)
    }

    /// True while a request is outstanding; the submit control should be
    /// disabled.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn has_pending_redirect(&self) -> bool {
        lock(&self.pending_redirect)
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Cancel a scheduled dashboard redirect. Returns whether one was pending.
    pub fn cancel_pending_redirect(&self) -> bool {
        match lock(&self.pending_redirect).take() {
            Some(task) => {
                let was_pending = !task.is_finished();
                task.cancel();
                was_pending
            }
            None => false,
        }
    }

    /// The token persisted by the last successful login, if any
    pub fn stored_token(&self) -> Result<Option<String>, StoreError> {
        self.store.get(TOKEN_KEY)
    }

    /// Run one login attempt for a form submission.
    pub async fn handle_submit(&self, event: &mut SubmitEvent) -> LoginOutcome {
        event.prevent_default();

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Login already in flight, ignoring submission");
            return LoginOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.set_phase(LoginPhase::Submitting);
        self.status.show_message(LOGGING_IN_MESSAGE, MessageKind::Info);

        let credentials = event.credentials();
        debug!(email = %credentials.email, "Submitting login");

        match self.api.login(credentials).await {
            Ok(response) => self.handle_response(response),
            Err(e) => {
                error!(error = %e, "Login error");
                self.network_error()
            }
        }
    }

    fn handle_response(&self, response: ApiResponse) -> LoginOutcome {
        if !response.is_success() {
            return self.handle_rejection(response);
        }

        let parsed: LoginResponse = match serde_json::from_str(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = %e, status = response.status, "Login error: malformed success body");
                return self.network_error();
            }
        };

        if let Err(e) = self.store.set(TOKEN_KEY, &parsed.token) {
            error!(error = %e, "Login error: failed to persist token");
            return self.network_error();
        }

        self.status.show_message(SUCCESS_MESSAGE, MessageKind::Success);
        self.schedule_redirect();
        self.set_phase(LoginPhase::Succeeded);
        info!("Login successful");

        LoginOutcome::Success {
            token: parsed.token,
        }
    }

    fn handle_rejection(&self, response: ApiResponse) -> LoginOutcome {
        let message = ErrorBody::parse(&response.body)
            .and_then(|body| body.message())
            .unwrap_or_else(|| FAILURE_MESSAGE.to_string());

        warn!(status = response.status, message = %message, "Login rejected");
        self.status.show_message(message.clone(), MessageKind::Error);
        self.set_phase(LoginPhase::Failed);
        LoginOutcome::Failure { message }
    }

    fn network_error(&self) -> LoginOutcome {
        self.status.show_message(NETWORK_ERROR_MESSAGE, MessageKind::Error);
        self.set_phase(LoginPhase::Failed);
        LoginOutcome::NetworkError
    }

    fn schedule_redirect(&self) {
        let navigator = Arc::clone(&self.navigator);
        let task = self
            .scheduler
            .schedule(REDIRECT_DELAY, move || navigator.navigate(DASHBOARD_PAGE));

        // Replacing an older handle cancels its redirect
        *lock(&self.pending_redirect) = Some(task);
    }

    fn set_phase(&self, phase: LoginPhase) {
        *lock(&self.phase) = phase;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
