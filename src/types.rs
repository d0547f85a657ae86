// Core types and errors

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The result type used throughout the Calven SDK
pub type CalvenResult<T> = Result<T, CalvenError>;

/// Shared, cloneable error source
pub type ErrorSource = Arc<dyn std::error::Error + Send + Sync>;

/// Convert reqwest::Error to our CalvenError without altering it
impl From<reqwest::Error> for CalvenError {
    fn from(err: reqwest::Error) -> Self {
        CalvenError::Transport {
            source: Arc::new(err),
            body: None,
        }
    }
}

/// API key and secret used to authenticate with Calven.
///
/// Both values are redacted from `Debug` and `Display` output and
/// overwritten when dropped.
pub struct Credentials {
    api_key: String,
    secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        // Zero bytes keep both strings valid UTF-8
        unsafe {
            self.api_key.as_bytes_mut().iter_mut().for_each(|b| *b = 0);
            self.secret.as_bytes_mut().iter_mut().for_each(|b| *b = 0);
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials([REDACTED])")
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED CREDENTIALS]")
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            secret: self.secret.clone(),
        }
    }
}

/// Per-call overrides applied to a single POST.
///
/// Headers are merged into the outgoing request before authentication runs,
/// so credential headers always win over a caller-supplied header of the
/// same name.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header to the request. Invalid names or values are rejected.
    pub fn header(mut self, name: &str, value: &str) -> CalvenResult<Self> {
        let name = reqwest::header::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            CalvenError::InvalidParameter(format!("invalid header name '{}': {}", name, e))
        })?;
        let value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
            CalvenError::InvalidParameter(format!("invalid value for header '{}': {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Error, Clone)]
pub enum CalvenError {
    /// Raised while constructing a client, before any network activity.
    ///
    /// Field order follows the service error shape: status code, message,
    /// short title, detail.
    #[error("{message}")]
    Configuration {
        status: u16,
        message: String,
        title: String,
        detail: Value,
        source: Option<ErrorSource>,
    },

    /// Failure reported by the HTTP layer: non-success status, timeout,
    /// connection failure. The underlying error is kept as-is, and the
    /// response body of a non-success reply is kept alongside it.
    #[error("HTTP request failed: {source}")]
    Transport {
        source: Arc<reqwest::Error>,
        body: Option<String>,
    },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Failed to parse API response: {message}")]
    Parse {
        message: String,
        source_text: Option<String>,
        source: Option<ErrorSource>,
    },

    #[error("Missing credentials: environment variable {variable} is not set")]
    MissingCredentials { variable: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CalvenError {
    pub fn configuration<M: Into<String>, T: Into<String>>(
        message: M,
        title: T,
        detail: Value,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let error = Self::Configuration {
            status: 500,
            message: message.into(),
            title: title.into(),
            detail,
            source: source.map(|e| Arc::new(e) as ErrorSource),
        };

        log::error!("{}", error);
        error
    }

    pub fn authentication<M: Into<String>>(message: M) -> Self {
        let error = Self::Authentication {
            message: message.into(),
        };

        log::error!("{}", error);
        error
    }

    pub fn parse_error<M: Into<String>>(
        message: M,
        source_text: Option<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let error = Self::Parse {
            message: message.into(),
            source_text: source_text.map(|text| sanitize_error_message(&text)),
            source: source.map(|e| Arc::new(e) as ErrorSource),
        };

        log::error!("{}", error);
        error
    }

    /// Machine-readable category of this error
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Transport { .. } => "transport",
            Self::Authentication { .. } => "authentication",
            Self::Parse { .. } => "parse",
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::InvalidParameter(_) => "invalid_parameter",
        }
    }

    /// HTTP status of a transport failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// The unmodified transport error
    pub fn transport_error(&self) -> Option<&reqwest::Error> {
        match self {
            Self::Transport { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Body the server sent with a non-success status, already sanitized
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Transport { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn source_error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            Self::Configuration { source, .. } => source.as_ref().map(|s| s.as_ref()),
            Self::Parse { source, .. } => source.as_ref().map(|s| s.as_ref()),
            _ => None,
        }
    }
}

lazy_static! {
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"[A-Za-z0-9_-]{20,}").expect("token pattern is a valid regex");
}

/// Redact long token-like runs so credentials never leak into error text or logs
pub fn sanitize_error_message(message: &str) -> String {
    TOKEN_PATTERN.replace_all(message, "[REDACTED]").into_owned()
}
