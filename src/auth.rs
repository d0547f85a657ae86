//! Authentication for outgoing requests.
//!
//! Calven authenticates each request with an API key and secret sent as
//! headers. [`ApiKeyAuth`] applies them as request middleware, and
//! [`authenticate`] wraps a [`BaseClient`] so every `post` it makes is
//! already authenticated.

use crate::domains::base::BaseClient;
use crate::middleware::RequestMiddleware;
use crate::types::*;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Request;
use std::sync::Arc;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the API secret
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Header carrying the caller's correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Adds the API key and secret headers to every request
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    credentials: Credentials,
}

impl ApiKeyAuth {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl RequestMiddleware for ApiKeyAuth {
    async fn process_request(&self, mut request: Request) -> CalvenResult<Request> {
        let key = sensitive_value(API_KEY_HEADER, self.credentials.api_key())?;
        let secret = sensitive_value(API_SECRET_HEADER, self.credentials.secret())?;

        let headers = request.headers_mut();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(HeaderName::from_static(API_SECRET_HEADER), secret);

        Ok(request)
    }
}

/// Propagates a correlation id for tracing across the call boundary
#[derive(Debug, Clone)]
pub struct CorrelationId {
    value: HeaderValue,
}

impl CorrelationId {
    pub fn new(correlation_id: &str) -> CalvenResult<Self> {
        let value = HeaderValue::from_str(correlation_id).map_err(|_| {
            CalvenError::InvalidParameter(format!(
                "correlation id '{}' is not a valid header value",
                correlation_id.escape_default()
            ))
        })?;
        Ok(Self { value })
    }
}

#[async_trait]
impl RequestMiddleware for CorrelationId {
    async fn process_request(&self, mut request: Request) -> CalvenResult<Request> {
        request
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), self.value.clone());
        Ok(request)
    }
}

/// Decorate a base client with credential headers, plus the correlation id
/// header when the client was configured with one.
pub fn authenticate<T, R>(
    client: BaseClient<T, R>,
    credentials: Credentials,
) -> CalvenResult<BaseClient<T, R>> {
    let client = match client.correlation_id() {
        Some(id) => {
            let correlation = CorrelationId::new(id)?;
            client.with_middleware(Arc::new(correlation))
        }
        None => client,
    };

    Ok(client.with_middleware(Arc::new(ApiKeyAuth::new(credentials))))
}

fn sensitive_value(header: &str, value: &str) -> CalvenResult<HeaderValue> {
    // The value itself is never echoed back
    let mut value = HeaderValue::from_str(value).map_err(|_| {
        CalvenError::authentication(format!("credential for {} is not a valid header value", header))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use url::Url;

    fn blank_request() -> Request {
        Request::new(
            Method::POST,
            Url::parse("https://api.example.com/v1/presence/").unwrap(),
        )
    }

    #[tokio::test]
    async fn api_key_auth_sets_both_headers() {
        let auth = ApiKeyAuth::new(Credentials::new("key1", "secret1"));
        let request = auth.process_request(blank_request()).await.unwrap();

        assert_eq!(request.headers()[API_KEY_HEADER], "key1");
        assert_eq!(request.headers()[API_SECRET_HEADER], "secret1");
        assert!(request.headers()[API_SECRET_HEADER].is_sensitive());
    }

    #[tokio::test]
    async fn unusable_credentials_fail_without_leaking() {
        let auth = ApiKeyAuth::new(Credentials::new("key1", "secret\nwith-newline"));
        let err = auth.process_request(blank_request()).await.unwrap_err();

        assert_eq!(err.category(), "authentication");
        assert!(!err.to_string().contains("with-newline"));
    }

    #[tokio::test]
    async fn correlation_id_is_forwarded() {
        let correlation = CorrelationId::new("corr-42").unwrap();
        let request = correlation.process_request(blank_request()).await.unwrap();

        assert_eq!(request.headers()[CORRELATION_ID_HEADER], "corr-42");
    }

    #[test]
    fn correlation_id_must_be_a_header_value() {
        assert!(CorrelationId::new("bad\r\nid").is_err());
    }
}
