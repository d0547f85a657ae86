// Presence Client

use crate::auth::authenticate;
use crate::client::ClientConfig;
use crate::domains::base::BaseClient;
use crate::domains::DomainClient;
use crate::types::*;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;
use url::Url;

/// Path of the presence API, relative to the base URL
pub const PRESENCE_PATH: &str = "v1/presence";

const LABEL: &str = "PresenceClient";

/// A single presence observation.
///
/// Nothing here is validated: `type` and `ts` may be absent, `ts` may be any
/// JSON value, and every other field is carried through untouched. The remote
/// service is the only judge of what an event may contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceEvent {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PresenceEvent {
    pub fn new(event_type: impl Into<String>, ts: impl Into<Value>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ts: Some(ts.into()),
            attributes: Map::new(),
        }
    }

    /// An event made only of the given fields
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            event_type: None,
            ts: None,
            attributes: fields,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRequest {
    pub source_id: String,
    pub presence_events: Vec<PresenceEvent>,
}

/// Response body of the presence API, exactly as the service returned it.
///
/// An empty body reads as `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceResponse {
    pub body: Value,
}

impl PresenceResponse {
    pub fn into_inner(self) -> Value {
        self.body
    }
}

impl Deref for PresenceResponse {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Sends presence events to Calven
#[derive(Debug, Clone)]
pub struct PresenceClient {
    base: BaseClient<PresenceRequest, PresenceResponse>,
}

impl PresenceClient {
    /// Create a presence client with its own HTTP connection pool.
    ///
    /// Fails if `base_url` is empty or cannot be joined with the presence path.
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        base_url: impl Into<String>,
        correlation_id: Option<String>,
    ) -> CalvenResult<Self> {
        Self::with_config(api_key, secret, base_url, correlation_id, &ClientConfig::default())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        base_url: impl Into<String>,
        correlation_id: Option<String>,
        config: &ClientConfig,
    ) -> CalvenResult<Self> {
        let base = BaseClient::with_config(LABEL, base_url, PRESENCE_PATH, correlation_id, config)?;
        let base = authenticate(base, Credentials::new(api_key, secret))?;
        Ok(Self { base })
    }

    pub(crate) fn from_parts(
        credentials: Credentials,
        base_url: &str,
        correlation_id: Option<String>,
        http_client: HttpClient,
    ) -> CalvenResult<Self> {
        let base = BaseClient::from_parts(LABEL, base_url, PRESENCE_PATH, correlation_id, http_client)?;
        let base = authenticate(base, credentials)?;
        Ok(Self { base })
    }

    /// Send presence events observed by `source_id`
    pub async fn send_presence(
        &self,
        source_id: impl Into<String>,
        presence_events: Vec<PresenceEvent>,
    ) -> CalvenResult<PresenceResponse> {
        self.send(source_id.into(), presence_events, None).await
    }

    /// Send presence events with per-call overrides such as a timeout
    pub async fn send_presence_with_options(
        &self,
        source_id: impl Into<String>,
        presence_events: Vec<PresenceEvent>,
        options: RequestOptions,
    ) -> CalvenResult<PresenceResponse> {
        self.send(source_id.into(), presence_events, Some(options)).await
    }

    async fn send(
        &self,
        source_id: String,
        presence_events: Vec<PresenceEvent>,
        options: Option<RequestOptions>,
    ) -> CalvenResult<PresenceResponse> {
        let request = PresenceRequest {
            source_id,
            presence_events,
        };

        self.base.post(&request, options).await
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.base.correlation_id()
    }

    /// URL every presence POST is sent to
    pub fn request_url(&self) -> &Url {
        self.base.request_url()
    }
}

impl DomainClient for PresenceClient {
    fn domain_name(&self) -> &str {
        self.base.label()
    }

    fn endpoint(&self) -> &Url {
        self.base.endpoint()
    }
}
