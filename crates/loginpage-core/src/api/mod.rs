//! REST API client module for the login backend.
//!
//! This module provides the `ApiClient` for talking to the backend service
//! that owns authentication. The controller only depends on the `LoginApi`
//! trait so it can be driven by a fake transport in tests.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResponse, LoginApi};
pub use error::ApiError;
