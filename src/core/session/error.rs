//! Typed failures of authentication and protected API calls

use serde::Deserialize;
use thiserror::Error;

/// Network-level failure: the request never produced an HTTP response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure of an AuthClient or protected request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// A protected endpoint answered 401; the session has been cleared
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// Any other non-success status
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Network unreachable, DNS failure, timeout...
    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    /// A success status whose body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The login succeeded remotely but a newer session change won locally
    #[error("Session changed while signing in")]
    Superseded,
}

impl AuthError {
    /// Text suitable for showing next to a form or in a toast
    pub fn detail(&self) -> String {
        match self {
            AuthError::Unauthorized { detail } | AuthError::Rejected { detail, .. } => {
                detail.clone()
            }
            AuthError::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AuthError::InvalidResponse(_) => {
                "The server sent an unexpected response.".to_string()
            }
            AuthError::Superseded => {
                "Your session changed while signing in. Please try again.".to_string()
            }
        }
    }

    /// Only transport failures and lost races are worth retrying unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Transport(_) | AuthError::Superseded)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Unauthorized { .. })
    }

    /// Build the error for a non-success response
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = error_detail(status, body);
        if status == 401 {
            AuthError::Unauthorized { detail }
        } else {
            AuthError::Rejected { status, detail }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    error: Option<String>,
}

/// Extract the server-provided message from an error body.
///
/// The API normally answers `{ "detail": "..." }`, but some routes use
/// `{ "error": "..." }` and validation failures put a list in `detail`.
pub fn error_detail(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();

    let from_body = parsed.and_then(|b| match b.detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => b.error.filter(|e| !e.is_empty()),
    });

    from_body.unwrap_or_else(|| fallback_detail(status))
}

fn fallback_detail(status: u16) -> String {
    match status {
        401 => "Your session has expired. Please log in again.".to_string(),
        403 => "You do not have access to this resource.".to_string(),
        429 => "Too many requests. Please wait and try again.".to_string(),
        500..=599 => format!("Server error ({status}). Please try again later."),
        _ => format!("Request failed with status {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_detail_field() {
        assert_eq!(
            error_detail(400, r#"{"detail":"Invalid credentials"}"#),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_detail_from_error_field() {
        assert_eq!(
            error_detail(401, r#"{"error":"Invalid email or password"}"#),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_detail_from_validation_list() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"}]}"#;
        assert_eq!(error_detail(422, body), "value is not a valid email address");
    }

    #[test]
    fn test_detail_fallback_for_non_json() {
        assert_eq!(
            error_detail(502, "<html>Bad Gateway</html>"),
            "Server error (502). Please try again later."
        );
        assert_eq!(error_detail(404, ""), "Request failed with status 404");
    }

    #[test]
    fn test_from_status_classifies_401() {
        let err = AuthError::from_status(401, r#"{"detail":"Session expired"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), "Session expired");

        let err = AuthError::from_status(403, r#"{"detail":"Forbidden"}"#);
        assert_eq!(
            err,
            AuthError::Rejected {
                status: 403,
                detail: "Forbidden".to_string()
            }
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(AuthError::Transport(TransportError::new("offline")).is_retryable());
        assert!(AuthError::Superseded.is_retryable());
        assert!(
            !AuthError::Rejected {
                status: 400,
                detail: "bad".into()
            }
            .is_retryable()
        );
        assert!(!AuthError::InvalidResponse("eof".into()).is_retryable());
    }
}
