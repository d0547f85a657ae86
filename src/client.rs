// Core Client Implementation

use crate::domains::presence::PresenceClient;
use crate::types::*;
use reqwest::{header, Client as HttpClient};
use serde_json::json;
use std::time::Duration;

/// Default Calven API base URL, used when no base URL is configured.
/// Override it with `with_base_url` or `CALVEN_API_BASE`.
pub const DEFAULT_API_BASE: &str = "https://api.calven.com/";

/// Configuration for TLS
#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub min_tls_version: Option<reqwest::tls::Version>,
    pub cert_verification: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_tls_version: Some(reqwest::tls::Version::TLS_1_2),
            cert_verification: true,
        }
    }
}

/// Settings for the underlying HTTP client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub tls: TlsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("calven-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            tls: TlsConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Build the reqwest client these settings describe
    pub(crate) fn build_http_client(&self, label: &str) -> CalvenResult<HttpClient> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = HttpClient::builder()
            .default_headers(headers)
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .danger_accept_invalid_certs(!self.tls.cert_verification);

        if let Some(version) = self.tls.min_tls_version {
            builder = builder.min_tls_version(version);
        }

        builder.build().map_err(|e| {
            CalvenError::configuration(
                format!("Unable to construct {} due to invalid HTTP settings", label),
                "Invalid client configuration",
                json!(e.to_string()),
                Some(e),
            )
        })
    }
}

/// Entry point holding one set of credentials and handing out domain clients.
///
/// Every domain client created from the same `Calven` shares its HTTP
/// connection pool.
#[derive(Clone, Debug)]
pub struct Calven {
    pub(crate) http_client: HttpClient,
    pub(crate) credentials: Credentials,
    pub base_url: String,
    pub correlation_id: Option<String>,
    config: ClientConfig,
}

impl Calven {
    /// Create a client for the default API base
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> CalvenResult<Self> {
        Self::with_config(api_key, secret, ClientConfig::default())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        config: ClientConfig,
    ) -> CalvenResult<Self> {
        let http_client = config.build_http_client("Calven")?;

        Ok(Self {
            http_client,
            credentials: Credentials::new(api_key, secret),
            base_url: DEFAULT_API_BASE.to_string(),
            correlation_id: None,
            config,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the correlation id sent with every request
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a client for the presence API
    pub fn presence(&self) -> CalvenResult<PresenceClient> {
        PresenceClient::from_parts(
            self.credentials.clone(),
            &self.base_url,
            self.correlation_id.clone(),
            self.http_client.clone(),
        )
    }
}
