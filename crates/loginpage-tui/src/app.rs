//! Application state management for the login page.
//!
//! This module contains the `App` struct that owns the form fields, the
//! login controller, and the background tasks started from the UI.

use std::sync::Arc;

use anyhow::{Context, Result};
use loginpage_core::models::UserProfile;
use loginpage_core::{
    ApiClient, ChannelNavigator, Config, LoginFormController, LoginOutcome, StatusSnapshot,
    SubmitEvent, TokenStore, TokioClock, DASHBOARD_PAGE, TOKEN_KEY,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Environment variable that pre-fills the email field
const EMAIL_ENV: &str = "LOGINPAGE_EMAIL";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    LoggingIn,
    Dashboard,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// What the dashboard knows about the logged-in user
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    NotLoaded,
    Loading,
    Loaded(UserProfile),
    Failed(String),
}

pub struct App {
    config: Config,
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    controller: Arc<LoginFormController>,
    nav_rx: mpsc::UnboundedReceiver<String>,
    submit_task: Option<JoinHandle<LoginOutcome>>,
    profile_task: Option<JoinHandle<Result<UserProfile>>>,

    pub state: AppState,
    /// State to return to when a quit confirmation is declined
    previous_state: AppState,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,

    pub profile: ProfileState,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let base_url = config.api_base_url();
        debug!(%base_url, "Backend configured");

        let api = ApiClient::new(base_url)?;
        let store = config.open_token_store()?;
        Ok(Self::from_parts(config, api, store))
    }

    pub fn from_parts(config: Config, api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        let (navigator, nav_rx) = ChannelNavigator::new();
        let controller = Arc::new(LoginFormController::new(
            Arc::new(api.clone()),
            store.clone(),
            Arc::new(navigator),
            Arc::new(TokioClock),
        ));

        // Pre-fill from env var or the last successful login
        let login_email = std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        let login_focus = if login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };

        Self {
            config,
            api,
            store,
            controller,
            nav_rx,
            submit_task: None,
            profile_task: None,
            state: AppState::LoggingIn,
            previous_state: AppState::LoggingIn,
            login_email,
            login_password: String::new(),
            login_focus,
            profile: ProfileState::NotLoaded,
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// True while a login request is outstanding or its outcome is uncollected
    pub fn is_submitting(&self) -> bool {
        self.submit_task.is_some() || self.controller.is_submitting()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.controller.status().snapshot()
    }

    /// Submit the login form. The request runs in the background so the UI
    /// keeps drawing; a submission while one is in flight is ignored.
    pub fn submit_login(&mut self) {
        if self.is_submitting() {
            debug!("Submit ignored, login in flight");
            return;
        }

        let mut event = SubmitEvent::new(self.login_email.clone(), self.login_password.clone());
        let controller = Arc::clone(&self.controller);
        self.submit_task = Some(tokio::spawn(async move {
            controller.handle_submit(&mut event).await
        }));
    }

    fn on_login_finished(&mut self, outcome: LoginOutcome) {
        match outcome {
            LoginOutcome::Success { .. } => {
                self.login_password.clear();
                self.config.last_email = Some(self.login_email.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
            }
            LoginOutcome::Failure { .. } | LoginOutcome::NetworkError => {
                self.login_focus = LoginFocus::Password;
            }
            LoginOutcome::Busy => {}
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch screens for a navigation target
    pub fn navigate(&mut self, target: &str) {
        if target == DASHBOARD_PAGE {
            info!("Showing dashboard");
            self.state = AppState::Dashboard;
            self.refresh_profile();
        } else {
            warn!(page = target, "Unknown navigation target");
        }
    }

    /// Ask the backend who the stored token belongs to
    pub fn refresh_profile(&mut self) {
        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.profile = ProfileState::Failed("No session token stored".to_string());
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read token");
                self.profile = ProfileState::Failed(format!("Could not read token: {}", e));
                return;
            }
        };

        self.profile = ProfileState::Loading;
        let api = self.api.clone();
        self.profile_task = Some(tokio::spawn(async move {
            api.verify_token(&token)
                .await
                .context("Token verification failed")
        }));
    }

    /// Return to the login form, keeping the stored token
    pub fn back_to_login(&mut self) {
        self.controller.cancel_pending_redirect();
        if let Some(task) = self.profile_task.take() {
            task.abort();
        }
        self.profile = ProfileState::NotLoaded;
        self.state = AppState::LoggingIn;
    }

    // =========================================================================
    // Quit handling
    // =========================================================================

    pub fn confirm_quit(&mut self) {
        if self.state != AppState::ConfirmingQuit {
            self.previous_state = self.state;
            self.state = AppState::ConfirmingQuit;
        }
    }

    pub fn cancel_quit(&mut self) {
        self.state = self.previous_state;
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    /// Collect finished background work and pending navigations
    pub async fn check_background_tasks(&mut self) {
        if self.submit_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.submit_task.take() {
                match task.await {
                    Ok(outcome) => {
                        debug!(?outcome, "Login finished");
                        self.on_login_finished(outcome);
                    }
                    Err(e) => warn!(error = %e, "Login task failed"),
                }
            }
        }

        if self.profile_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.profile_task.take() {
                self.profile = match task.await {
                    Ok(Ok(user)) => ProfileState::Loaded(user),
                    Ok(Err(e)) => {
                        warn!(error = %e, "Profile refresh failed");
                        ProfileState::Failed(format!("{:#}", e))
                    }
                    Err(e) => ProfileState::Failed(e.to_string()),
                };
            }
        }

        while let Ok(target) = self.nav_rx.try_recv() {
            self.navigate(&target);
        }
    }
}

// ============================================================================
// Input validation
// ============================================================================

/// Check if a character can be added to the email field
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && !c.is_control() && !c.is_whitespace()
}

/// Check if a character can be added to the password field
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginpage_core::controller::NETWORK_ERROR_MESSAGE;
    use loginpage_core::MemoryTokenStore;

    fn test_app(store: Arc<dyn TokenStore>) -> App {
        // Nothing listens on port 9; requests fail fast
        let api = ApiClient::new("http://127.0.0.1:9").expect("client builds");
        App::from_parts(Config::default(), api, store)
    }

    // -------------------------------------------------------------------------
    // Focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_focus_next() {
        assert_eq!(LoginFocus::Email.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::Password.next(), LoginFocus::Button);
        assert_eq!(LoginFocus::Button.next(), LoginFocus::Email); // Wraps around
    }

    #[test]
    fn test_focus_prev() {
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::Button); // Wraps around
        assert_eq!(LoginFocus::Button.prev(), LoginFocus::Password);
        assert_eq!(LoginFocus::Password.prev(), LoginFocus::Email);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(0, '@'));
        assert!(can_add_email_char(253, 'z'));
        // Exceeds max length
        assert!(!can_add_email_char(254, 'a'));
        // Control characters and spaces rejected
        assert!(!can_add_email_char(0, '\x00'));
        assert!(!can_add_email_char(0, '\n'));
        assert!(!can_add_email_char(0, ' '));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(0, ' '));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    // -------------------------------------------------------------------------
    // Navigation Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_navigate_to_dashboard_without_token() {
        let mut app = test_app(Arc::new(MemoryTokenStore::new()));
        app.navigate(DASHBOARD_PAGE);
        assert_eq!(app.state, AppState::Dashboard);
        assert!(matches!(app.profile, ProfileState::Failed(_)));
    }

    #[tokio::test]
    async fn test_navigate_to_dashboard_with_token_starts_verification() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(TOKEN_KEY, "abc123").unwrap();
        let mut app = test_app(store);

        app.navigate(DASHBOARD_PAGE);
        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.profile, ProfileState::Loading);

        app.back_to_login();
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.profile, ProfileState::NotLoaded);
    }

    #[tokio::test]
    async fn test_unknown_navigation_target_is_ignored() {
        let mut app = test_app(Arc::new(MemoryTokenStore::new()));
        app.navigate("elsewhere.html");
        assert_eq!(app.state, AppState::LoggingIn);
    }

    // -------------------------------------------------------------------------
    // Submit Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_second_submit_before_first_runs_is_ignored() {
        let mut app = test_app(Arc::new(MemoryTokenStore::new()));
        app.login_email = "ada@example.com".to_string();
        app.login_password = "hunter2".to_string();
        app.login_focus = LoginFocus::Button;

        // Neither task has been polled yet
        app.submit_login();
        assert!(app.is_submitting());
        app.submit_login();

        for _ in 0..500 {
            app.check_background_tasks().await;
            if app.submit_task.is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(app.submit_task.is_none());
        assert!(!app.is_submitting());
        // The first request's outcome was collected
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert_eq!(app.status().text, NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_quit_confirmation_restores_previous_state() {
        let mut app = test_app(Arc::new(MemoryTokenStore::new()));
        app.navigate(DASHBOARD_PAGE);
        app.confirm_quit();
        assert_eq!(app.state, AppState::ConfirmingQuit);
        app.cancel_quit();
        assert_eq!(app.state, AppState::Dashboard);
    }

    #[tokio::test]
    async fn test_failed_submit_reports_network_error() {
        let mut app = test_app(Arc::new(MemoryTokenStore::new()));
        app.login_email = "ada@example.com".to_string();
        app.login_password = "hunter2".to_string();

        app.submit_login();
        while app.submit_task.is_some() {
            tokio::task::yield_now().await;
            app.check_background_tasks().await;
        }

        assert_eq!(app.status().text, "Network error. Please try again.");
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_focus, LoginFocus::Password);
        // Password is kept so the user can retry
        assert_eq!(app.login_password, "hunter2");
    }
}
