//! # calven-rs: A Rust SDK for the Calven presence API
//!
//! Typed, authenticated clients for the Calven API. Each call is one JSON
//! POST: the request envelope is serialized, credential headers are added,
//! and the response body is deserialized into a typed value.
//!
//! ## Key Features
//!
//! - Endpoint resolved and validated once, when a client is constructed
//! - API key and secret applied as request middleware
//! - Correlation ids forwarded on every request
//! - Transport failures returned untouched, with no retries
//!
//! ## Basic Usage
//!
//! ```no_run
//! use calven_rs::{PresenceClient, PresenceEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PresenceClient::new("key1", "secret1", "https://api.example.com/", None)?;
//!
//!     let response = client
//!         .send_presence("src-1", vec![PresenceEvent::new("arrival", 1000)])
//!         .await?;
//!
//!     println!("{:?}", response);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod domains;
mod middleware;
pub mod types;

// Re-export core components
pub use client::{Calven, ClientConfig, TlsConfig, DEFAULT_API_BASE};
pub use middleware::RequestMiddleware;
pub use types::{sanitize_error_message, CalvenError, CalvenResult, Credentials, RequestOptions};

// Public domain access
pub use domains::{
    BaseClient, DomainClient, PresenceClient, PresenceEvent, PresenceRequest, PresenceResponse,
};

pub mod prelude {
    //! Convenient imports for commonly used types and functions
    pub use crate::{
        from_env, Calven, CalvenError, CalvenResult, ClientConfig, PresenceClient, PresenceEvent,
        PresenceResponse, RequestOptions,
    };
}

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "CALVEN_API_KEY";
/// Environment variable holding the API secret
pub const API_SECRET_ENV: &str = "CALVEN_API_SECRET";
/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "CALVEN_API_BASE";
/// Environment variable holding a correlation id
pub const CORRELATION_ID_ENV: &str = "CALVEN_CORRELATION_ID";

// Entry point functions
pub fn new_client(api_key: impl Into<String>, secret: impl Into<String>) -> CalvenResult<Calven> {
    Calven::new(api_key, secret)
}

/// Build a client from `CALVEN_API_KEY` and `CALVEN_API_SECRET`, with
/// optional `CALVEN_API_BASE` and `CALVEN_CORRELATION_ID`.
pub fn from_env() -> CalvenResult<Calven> {
    let api_key = required_env(API_KEY_ENV)?;
    let secret = required_env(API_SECRET_ENV)?;

    let mut calven = Calven::new(api_key, secret)?;
    if let Ok(base_url) = std::env::var(API_BASE_ENV) {
        calven = calven.with_base_url(base_url);
    }
    if let Ok(correlation_id) = std::env::var(CORRELATION_ID_ENV) {
        calven = calven.with_correlation_id(correlation_id);
    }

    Ok(calven)
}

fn required_env(variable: &str) -> CalvenResult<String> {
    match std::env::var(variable) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(CalvenError::MissingCredentials {
            variable: variable.to_string(),
        }),
    }
}
