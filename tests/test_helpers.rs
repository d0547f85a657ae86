use calven_rs::{PresenceClient, PresenceEvent};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::net::TcpListener;

pub const API_KEY: &str = "key1";
pub const SECRET: &str = "secret1";

/// A mock Calven server and a presence client pointed at it
#[allow(dead_code)]
pub struct PresenceTester {
    pub server: ServerGuard,
    pub client: PresenceClient,
}

#[allow(dead_code)]
impl PresenceTester {
    pub async fn new() -> Self {
        Self::with_correlation_id(None).await
    }

    pub async fn with_correlation_id(correlation_id: Option<&str>) -> Self {
        let server = Server::new_async().await;
        let base_url = format!("{}/", server.url());
        let client = PresenceClient::new(
            API_KEY,
            SECRET,
            base_url,
            correlation_id.map(str::to_string),
        )
        .expect("mock server url is valid");

        Self { server, client }
    }

    /// A presence POST mock that checks credentials and JSON content type
    pub fn presence_mock(&mut self) -> Mock {
        self.server
            .mock("POST", "/v1/presence/")
            .match_header("x-api-key", API_KEY)
            .match_header("x-api-secret", SECRET)
            .match_header("content-type", "application/json")
    }

    /// Mock that answers every presence POST with the request body it received
    pub async fn echo_mock(&mut self) -> Mock {
        self.presence_mock()
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(|request| request.body().cloned().unwrap_or_default())
            .create_async()
            .await
    }

    pub async fn json_mock(&mut self, status: usize, body: &str) -> Mock {
        self.presence_mock()
            .match_body(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

#[allow(dead_code)]
pub fn arrival(ts: i64) -> PresenceEvent {
    PresenceEvent::new("arrival", ts)
}

#[allow(dead_code)]
pub fn sample_events() -> Vec<PresenceEvent> {
    vec![
        PresenceEvent::new("arrival", 1000).with_attribute("userId", "u-1"),
        PresenceEvent::new("departure", 2000)
            .with_attribute("userId", "u-1")
            .with_attribute("zone", "level-3"),
    ]
}

/// A local address that accepts connections but never answers
#[allow(dead_code)]
pub fn silent_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let url = format!("http://{}/", listener.local_addr().expect("local addr"));
    (listener, url)
}

/// A local address with nothing listening on it
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let url = format!("http://{}/", listener.local_addr().expect("local addr"));
    drop(listener);
    url
}
