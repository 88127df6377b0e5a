use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// `403` from the service. The session has already been cleared.
    #[error("Access denied - session cleared: {0}")]
    Forbidden(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network failure or timeout
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not load public products: {0}")]
    PublicFetch(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
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

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            StatusCode::FORBIDDEN => ApiError::Forbidden(truncated),
            _ => ApiError::Http {
                status: status.as_u16(),
                body: truncated,
            },
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Forbidden(_) => Some(StatusCode::FORBIDDEN.as_u16()),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
