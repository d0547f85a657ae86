//! Base implementation for domain-specific API clients.
//!
//! [`BaseClient`] resolves one endpoint at construction time and performs
//! JSON POST requests against it. Domain clients wrap a `BaseClient` fixed
//! to their own path and request/response shapes.

use crate::client::ClientConfig;
use crate::middleware::RequestMiddleware;
use crate::types::*;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Generic POST executor for one resolved endpoint.
///
/// `T` is the request body shape and `R` the response body shape. Nothing is
/// mutated after construction, so a client can be shared across tasks.
pub struct BaseClient<T, R> {
    label: String,
    base_url: String,
    path: String,
    correlation_id: Option<String>,
    endpoint: Url,
    request_url: Url,
    http_client: HttpClient,
    request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    _shape: PhantomData<fn(&T) -> R>,
}

impl<T, R> BaseClient<T, R> {
    /// Create a client with its own HTTP connection pool built from the
    /// default configuration.
    pub fn new(
        label: impl Into<String>,
        base_url: impl Into<String>,
        path: impl Into<String>,
        correlation_id: Option<String>,
    ) -> CalvenResult<Self> {
        Self::with_config(label, base_url, path, correlation_id, &ClientConfig::default())
    }

    pub fn with_config(
        label: impl Into<String>,
        base_url: impl Into<String>,
        path: impl Into<String>,
        correlation_id: Option<String>,
        config: &ClientConfig,
    ) -> CalvenResult<Self> {
        let label = label.into();
        let base_url = base_url.into();
        let path = path.into();

        // Resolve first so a bad URL fails before any client is built
        let (endpoint, request_url) = resolve_endpoint(&label, &base_url, &path)?;
        let http_client = config.build_http_client(&label)?;

        Ok(Self::assemble(
            label,
            base_url,
            path,
            correlation_id,
            endpoint,
            request_url,
            http_client,
        ))
    }

    /// Create a client that shares an existing HTTP client
    pub fn from_parts(
        label: impl Into<String>,
        base_url: impl Into<String>,
        path: impl Into<String>,
        correlation_id: Option<String>,
        http_client: HttpClient,
    ) -> CalvenResult<Self> {
        let label = label.into();
        let base_url = base_url.into();
        let path = path.into();
        let (endpoint, request_url) = resolve_endpoint(&label, &base_url, &path)?;

        Ok(Self::assemble(
            label,
            base_url,
            path,
            correlation_id,
            endpoint,
            request_url,
            http_client,
        ))
    }

    fn assemble(
        label: String,
        base_url: String,
        path: String,
        correlation_id: Option<String>,
        endpoint: Url,
        request_url: Url,
        http_client: HttpClient,
    ) -> Self {
        Self {
            label,
            base_url,
            path,
            correlation_id,
            endpoint,
            request_url,
            http_client,
            request_middleware: Vec::new(),
            _shape: PhantomData,
        }
    }

    /// Add middleware that processes every request before it is sent.
    /// Middleware runs in the order it was added.
    pub fn with_middleware(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.request_middleware.push(middleware);
        self
    }

    /// Name used in error messages and logs
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// The base URL joined with the path
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The root of the endpoint, where every POST is sent
    pub fn request_url(&self) -> &Url {
        &self.request_url
    }
}

impl<T, R> BaseClient<T, R>
where
    T: Serialize + Sync,
    R: DeserializeOwned,
{
    /// POST `payload` as JSON and deserialize the response body as `R`.
    ///
    /// Transport failures, including non-success statuses, are returned as
    /// [`CalvenError::Transport`] holding the untouched `reqwest::Error` and,
    /// for a non-success status, the response body. An empty success body is
    /// deserialized as JSON `null`.
    pub async fn post(&self, payload: &T, options: Option<RequestOptions>) -> CalvenResult<R> {
        let options = options.unwrap_or_default();

        let mut builder = self.http_client.post(self.request_url.clone()).json(payload);
        if !options.headers.is_empty() {
            builder = builder.headers(options.headers);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let mut request = builder.build()?;

        for middleware in &self.request_middleware {
            request = middleware.process_request(request).await?;
        }

        debug!(client = %self.label, url = %request.url(), "sending POST");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| self.transport_failure(e, None))?;

        if let Some(e) = response.error_for_status_ref().err() {
            let body = response
                .text()
                .await
                .ok()
                .filter(|text| !text.is_empty())
                .map(|text| sanitize_error_message(&text));
            return Err(self.transport_failure(e, body));
        }

        let body = response.bytes().await?;
        // An empty body (202/204) reads as JSON null
        let parsed = if body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&body)
        };
        parsed.map_err(|e| {
            CalvenError::parse_error(
                format!("{} response did not match the expected shape: {}", self.label, e),
                Some(String::from_utf8_lossy(&body).into_owned()),
                Some(e),
            )
        })
    }

    fn transport_failure(&self, source: reqwest::Error, body: Option<String>) -> CalvenError {
        warn!(
            client = %self.label,
            status = ?source.status(),
            error = %sanitize_error_message(&source.to_string()),
            "POST failed"
        );
        CalvenError::Transport {
            source: Arc::new(source),
            body,
        }
    }
}

impl<T, R> Clone for BaseClient<T, R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            base_url: self.base_url.clone(),
            path: self.path.clone(),
            correlation_id: self.correlation_id.clone(),
            endpoint: self.endpoint.clone(),
            request_url: self.request_url.clone(),
            http_client: self.http_client.clone(),
            request_middleware: self.request_middleware.clone(),
            _shape: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for BaseClient<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseClient")
            .field("label", &self.label)
            .field("endpoint", &self.endpoint.as_str())
            .field("correlation_id", &self.correlation_id)
            .field("middleware", &self.request_middleware.len())
            .finish()
    }
}

/// Join `path` onto `base_url`, returning the endpoint and the root URL that
/// requests are posted to (the endpoint with exactly one trailing slash).
pub(crate) fn resolve_endpoint(
    label: &str,
    base_url: &str,
    path: &str,
) -> CalvenResult<(Url, Url)> {
    if base_url.is_empty() {
        return Err(CalvenError::configuration(
            format!("Unable to construct {} due to missing service URL", label),
            "Missing service URL",
            json!({ "baseUrl": base_url, "path": path }),
            None::<url::ParseError>,
        ));
    }

    let invalid = |detail: String, source: Option<url::ParseError>| {
        CalvenError::configuration(
            format!(
                "Unable to construct {} with baseUrl '{}' and path '{}'",
                label, base_url, path
            ),
            "Invalid service URL",
            json!(detail),
            source,
        )
    };

    let endpoint = Url::parse(base_url)
        .and_then(|base| base.join(path))
        .map_err(|e| invalid(e.to_string(), Some(e)))?;

    let request_url = root_url(&endpoint)
        .ok_or_else(|| invalid(format!("'{}' cannot carry a path", endpoint), None))?;

    Ok((endpoint, request_url))
}

fn root_url(endpoint: &Url) -> Option<Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut().ok()?.pop_if_empty().push("");
    Some(url)
}
