use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the backend. The interceptor has already cleared the
    /// session by the time this surfaces.
    #[error("{}", .message.as_deref().unwrap_or("Unauthorized"))]
    Unauthorized { message: Option<String> },

    /// A 4xx with a structured, human-readable message in the body
    #[error("{message}")]
    Rejected { message: String },

    /// Signup hit the backend's duplicate-key signature for the email field
    #[error("This email address is already registered")]
    DuplicateEmail,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Structured error body the backend sends on rejections
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data around
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Extract the server-supplied human-readable message, if the body
    /// carries one.
    fn server_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
    }

    /// MongoDB duplicate-key signature, which the backend forwards verbatim
    /// when an email is already registered.
    fn is_duplicate_key(body: &str) -> bool {
        body.contains("E11000") || body.to_lowercase().contains("duplicate key")
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized {
                message: Self::server_message(body),
            },
            400..=499 if Self::is_duplicate_key(body) => ApiError::DuplicateEmail,
            400..=499 => match Self::server_message(body) {
                Some(message) => ApiError::Rejected { message },
                None => ApiError::InvalidResponse(format!(
                    "Status {}: {}",
                    status,
                    Self::truncate_body(body)
                )),
            },
            500..=599 => ApiError::Server(Self::truncate_body(body)),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }
}
