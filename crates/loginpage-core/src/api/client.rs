//! API client for communicating with the login backend.
//!
//! This module provides the `ApiClient` struct, which wraps a shared
//! `reqwest::Client` and knows the backend's endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Credentials, HealthStatus, RegisterRequest, UserProfile, UserResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/login";
const REGISTER_PATH: &str = "/api/register";
const VERIFY_TOKEN_PATH: &str = "/api/verify-token";
const HEALTH_PATH: &str = "/";

/// HTTP request timeout in seconds.
/// This is the transport's own limit; the login controller adds none of its own.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Raw outcome of a request that reached the server.
///
/// The status code alone decides success; the body is handed over untouched
/// so the caller can interpret it for either branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single call the login form depends on.
#[async_trait]
pub trait LoginApi: Send + Sync {
    /// POST the credentials to the login endpoint. `Err` means the request
    /// never produced a response.
    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError>;
}

/// API client for the login backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Create a new account. The backend answers 201 with the stored profile.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<UserProfile> {
        let url = self.url(REGISTER_PATH);
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send registration request")?;

        let response = Self::check_response(response).await?;
        let parsed: UserResponse = Self::parse_json(response, &url).await?;
        debug!(email = %parsed.user.email, "Registered user");
        Ok(parsed.user)
    }

    /// Ask the backend who a token belongs to
    pub async fn verify_token(&self, token: &str) -> Result<UserProfile> {
        let url = self.url(VERIFY_TOKEN_PATH);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send token verification request")?;

        let response = Self::check_response(response).await?;
        let parsed: UserResponse = Self::parse_json(response, &url).await?;
        Ok(parsed.user)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url(HEALTH_PATH);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .context("Failed to reach backend")?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }
}

#[async_trait]
impl LoginApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, email = %credentials.email, "Sending login request");

        // `.json()` sets Content-Type: application/json
        let response = self.client.post(&url).json(credentials).send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}
