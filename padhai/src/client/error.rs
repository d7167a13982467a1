use thiserror::Error;

use crate::domain::ValidationError;

/// Failure of a single gateway call. Every error is scoped to the request that
/// produced it; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthorized,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{}", status_message(.status, .message))]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response: {0}")]
    Parsing(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn status_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("{message} (HTTP {status})"),
        None => format!("request failed with HTTP {status}"),
    }
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn status(status: u16, message: Option<String>) -> Self {
        ApiError::Status { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Parsing(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_include_backend_message() {
        let e = ApiError::status(409, Some("Subject already exists".to_string()));
        assert_eq!(e.to_string(), "Subject already exists (HTTP 409)");

        let e = ApiError::status(500, None);
        assert_eq!(e.to_string(), "request failed with HTTP 500");
    }

    #[test]
    fn validation_errors_pass_through() {
        let e = ApiError::from(ValidationError::Required("chapter name"));
        assert_eq!(e.to_string(), "chapter name is required");
        assert!(!e.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
    }
}
