use std::fmt;

use sheetsync_core::RemoteError;

/// Error type for Sheets/Drive API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsError {
    /// Could not build the HTTP client or reach the server
    Network(String),
    /// Non-2xx response: status code and the API's error message
    Http(u16, String),
    /// Response body did not have the expected shape
    Parse(String),
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetsError::Network(msg) => write!(f, "Network error: {}", msg),
            SheetsError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            SheetsError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for SheetsError {}

impl From<SheetsError> for RemoteError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Http(401 | 403, msg) => RemoteError::PermissionDenied(msg),
            SheetsError::Http(_, ref msg) if msg.contains("PERMISSION_DENIED") => {
                RemoteError::PermissionDenied(msg.clone())
            }
            SheetsError::Http(404, msg) => RemoteError::NotFound(msg),
            SheetsError::Http(400 | 422, msg) => RemoteError::Rejected(msg),
            other => RemoteError::Transport(other.to_string()),
        }
    }
}

/// Pull `error.message` (and `error.status`) out of a Google API error body.
/// Falls back to the raw body.
pub(crate) fn api_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    let message = json["error"]["message"].as_str();
    let status = json["error"]["status"].as_str();
    match (message, status) {
        (Some(m), Some(s)) => format!("{} ({})", m, s),
        (Some(m), None) => m.to_string(),
        _ => body.trim().to_string(),
    }
}
