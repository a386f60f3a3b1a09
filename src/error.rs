use crate::validation::FieldErrors;

/// Errors produced by portal client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("server returned {status}{}", suffix(.message))]
    Status { status: u16, message: Option<String> },

    /// The body could not be read as the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// A success response lacked a field the caller depends on.
    #[error("{0}")]
    MissingField(&'static str),

    /// Input was rejected before any request was made.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("local storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

fn suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Message to show the user: the backend's own message when it sent one,
    /// validation details for rejected input, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            Self::Validation(errors) => errors.to_string(),
            _ => fallback.to_string(),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
