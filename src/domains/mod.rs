//! Domain-Specific API Implementations
//!
//! Each domain client fixes one API path and the request/response shapes for
//! that path, exposing named methods instead of a generic `post`.
//!
//! ## Architecture
//!
//! Clients are layered by composition:
//!
//! - [`base::BaseClient`]: resolves the endpoint and performs JSON POSTs
//! - [`crate::auth::authenticate`]: decorates a base client with credential headers
//! - Domain clients such as [`PresenceClient`] build the request envelope
//!   and delegate to the decorated base client
//!
//! ## Example: Adding a Domain Client
//!
//! ```rust
//! use calven_rs::{CalvenResult, Credentials};
//! use calven_rs::auth::authenticate;
//! use calven_rs::domains::{DomainClient, base::BaseClient};
//! use serde::{Deserialize, Serialize};
//! use url::Url;
//!
//! #[derive(Serialize)]
//! struct OccupancyRequest { space_id: String }
//!
//! #[derive(Deserialize)]
//! struct OccupancyResponse { count: u32 }
//!
//! struct OccupancyClient {
//!     base: BaseClient<OccupancyRequest, OccupancyResponse>,
//! }
//!
//! impl OccupancyClient {
//!     pub fn new(api_key: &str, secret: &str, base_url: &str) -> CalvenResult<Self> {
//!         let base = BaseClient::new("OccupancyClient", base_url, "v1/occupancy", None)?;
//!         let base = authenticate(base, Credentials::new(api_key, secret))?;
//!         Ok(Self { base })
//!     }
//!
//!     pub async fn occupancy(&self, space_id: &str) -> CalvenResult<OccupancyResponse> {
//!         let request = OccupancyRequest { space_id: space_id.to_string() };
//!         self.base.post(&request, None).await
//!     }
//! }
//!
//! impl DomainClient for OccupancyClient {
//!     fn domain_name(&self) -> &str {
//!         self.base.label()
//!     }
//!
//!     fn endpoint(&self) -> &Url {
//!         self.base.endpoint()
//!     }
//! }
//! ```

pub mod base;
pub mod presence;

pub use base::BaseClient;
pub use presence::{PresenceClient, PresenceEvent, PresenceRequest, PresenceResponse, PRESENCE_PATH};

use url::Url;

/// Common trait for all domain clients
pub trait DomainClient: Send + Sync {
    /// Label used in error messages and logs
    fn domain_name(&self) -> &str;

    /// The resolved endpoint this client talks to
    fn endpoint(&self) -> &Url;
}
