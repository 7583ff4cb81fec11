use std::fmt;

use thiserror::Error;

/// Top-level error type for the `skytap-api` crate.
///
/// Covers transport failures, non-2xx responses and payload decoding.
/// The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. Carries the parsed JSON body when there is one,
    /// otherwise the raw text, plus the resource that was requested.
    #[error("HTTP {status} from Skytap API for '{resource}': {body}")]
    HttpRequestFailed {
        status: u16,
        resource: String,
        body: ErrorBody,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or joining error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the API rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::HttpRequestFailed { status: 401 | 403, .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpRequestFailed { status: 404, .. })
    }
}

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorBody {
    /// Classify a raw response body.
    ///
    /// JSON that parses to an empty or false-like value (`{}`, `[]`, `""`,
    /// `0`, `false`, `null`) keeps the raw text instead, and so does
    /// anything that is not JSON at all.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) if is_truthy(&value) => Self::Json(value),
            _ => Self::Text(text),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) if text.is_empty() => f.write_str("(empty body)"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
