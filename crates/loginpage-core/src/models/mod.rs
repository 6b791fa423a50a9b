//! Data models for the login backend.
//!
//! Request bodies are sent exactly as the backend expects them; response
//! types are lenient where the backend treats fields as optional.

pub mod auth;

pub use auth::{
    Credentials, ErrorBody, HealthStatus, LoginResponse, RegisterRequest, UserId, UserProfile,
    UserResponse,
};
