use rollcall_core::CoreError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl SyncError {
    /// Build a [`SyncError::Server`] from a non-success response body.
    ///
    /// The backend reports failures as `{ "error": "..." }`; that string is
    /// kept verbatim. Any other body is passed through trimmed.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.error,
            Err(_) => body.trim().to_string(),
        };
        Self::Server { status, message }
    }

    /// Text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } if !message.is_empty() => message.clone(),
            Self::Server { status, .. } => format!("request failed with status {status}"),
            other => other.to_string(),
        }
    }
}

/// Failures of the fetch/save workflows.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("could not load students: {}", .0.user_message())]
    RosterUnavailable(#[source] SyncError),
    #[error("could not load attendance records: {}", .0.user_message())]
    RecordsUnavailable(#[source] SyncError),
    /// The backend refused the save batch; the message is the backend's own.
    #[error("{message}")]
    SaveRejected { message: String },
    #[error("{message}")]
    StudentRejected { message: String },
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_extracted() {
        let err = SyncError::from_response(400, r#"{"error": "Student ID already exists"}"#);
        assert_eq!(err.user_message(), "Student ID already exists");
        assert_eq!(err.to_string(), "server returned 400: Student ID already exists");
    }

    #[test]
    fn non_json_body_passed_through() {
        let err = SyncError::from_response(502, "  Bad Gateway\n");
        assert_eq!(err.user_message(), "Bad Gateway");
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let err = SyncError::from_response(500, "");
        assert_eq!(err.user_message(), "request failed with status 500");
    }

    #[test]
    fn save_rejection_is_verbatim() {
        let err = WorkflowError::SaveRejected {
            message: "CHECK constraint failed: status".into(),
        };
        assert_eq!(err.to_string(), "CHECK constraint failed: status");
    }
}
