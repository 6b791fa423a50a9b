use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status and a labelled error.
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build an error from a non-success response. The backend's `error`
    /// field wins over anything derived from the status code.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if let Some(message) = ErrorBody::parse(body).and_then(|b| b.message()) {
            return ApiError::Rejected {
                status: status.as_u16(),
                message,
            };
        }

        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
