// Middleware and Extension Traits

use crate::types::CalvenResult;
use async_trait::async_trait;
use reqwest::Request;

/// Decorates a fully built request before it leaves the client.
///
/// Failures are returned through the same `CalvenResult` channel as transport
/// failures, so callers see one error path per call.
#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    /// Process and possibly modify the request before sending
    async fn process_request(&self, request: Request) -> CalvenResult<Request>;
}
