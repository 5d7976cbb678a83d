//! Fixtures for tests that talk to a completion endpoint.

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{ChatClient, ChatConfig, Credential};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Server answering every completion POST with `status` and `body`.
pub async fn completion_server(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(status).set_body_raw(body.to_owned(), "application/json"),
        )
        .mount(&server)
        .await;
    server
}

pub fn endpoint(server: &MockServer) -> String {
    format!("{}{COMPLETIONS_PATH}", server.uri())
}

pub fn client_for(server: &MockServer, key: Option<&str>) -> ChatClient {
    let config = ChatConfig::default().with_endpoint(endpoint(server));
    ChatClient::new(config, key.map(Credential::new)).unwrap()
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

/// JSON body of the single request the server received.
pub async fn only_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0].body_json().unwrap()
}
