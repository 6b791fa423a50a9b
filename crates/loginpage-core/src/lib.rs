//! Core library for loginpage.
//!
//! This crate holds everything the login form needs that is not tied to a
//! particular front end:
//!
//! - `controller`: the `LoginFormController` that runs one login attempt per submission
//! - `status`: the single status line shown to the user
//! - `api`: the HTTP client for the login backend
//! - `store`: durable key-value storage for the session token
//! - `navigation` / `schedule`: injectable navigator, clock and cancellable timers
//! - `config`: base URL and remembered form values

pub mod api;
pub mod config;
pub mod controller;
pub mod models;
pub mod navigation;
pub mod schedule;
pub mod status;
pub mod store;

pub use api::{ApiClient, ApiError, ApiResponse, LoginApi};
pub use config::{Config, TokenBackend, DEFAULT_API_BASE_URL};
pub use controller::{LoginFormController, LoginOutcome, LoginPhase, SubmitEvent, REDIRECT_DELAY};
pub use navigation::{ChannelNavigator, Navigator, RecordingNavigator, DASHBOARD_PAGE};
pub use schedule::{Clock, ScheduledTask, Scheduler, TokioClock};
pub use status::{MessageKind, StatusDisplay, StatusSnapshot, SUCCESS_HIDE_DELAY};
pub use store::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_KEY,
};
