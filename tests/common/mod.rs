//! Engine API mock server shared by the integration tests.

#![allow(dead_code)]

use flowctl::engine::{Credential, EngineClient, RetryPolicy};
use flowctl::http::TransportSettings;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "mock-token";
pub const API: &str = "/api/v1";

/// Workflow engine mock server for deterministic testing
pub struct EngineApiMock {
    pub server: MockServer,
}

impl EngineApiMock {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}{API}", self.server.uri())
    }

    /// Client with fast, jitter-free retries.
    pub fn client(&self) -> EngineClient {
        EngineClient::new(TransportSettings {
            base_url: self.base_url(),
            timeout: Duration::from_secs(5),
            requests_per_second: 1_000,
            burst: 1_000,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(50),
                jitter: false,
            },
        })
        .expect("mock base url is valid")
    }

    pub fn alice(&self) -> Credential {
        Credential::bearer(TOKEN).with_user("alice")
    }

    pub fn api_path(suffix: &str) -> String {
        format!("{API}{suffix}")
    }

    /// Serve `body` for one GET, ahead of any later mock on the same path.
    pub async fn mock_get_once(&self, suffix: &str, body: Value) {
        self.mock_get_times(suffix, body, 1).await;
    }

    /// Serve `body` for the next `times` GETs. Earlier calls take precedence
    /// over later ones until they are used up.
    pub async fn mock_get_times(&self, suffix: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(Self::api_path(suffix)))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get(&self, suffix: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(Self::api_path(suffix)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one request with `verb` on `suffix`.
    pub async fn expect_once(&self, verb: &str, suffix: &str, status: u16, body: Option<Value>) {
        let template = match body {
            Some(body) => ResponseTemplate::new(status).set_body_json(body),
            None => ResponseTemplate::new(status),
        };
        Mock::given(method(verb))
            .and(path(Self::api_path(suffix)))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(template)
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

pub fn instance_json(id: &str, end_time: Option<&str>, suspended: bool) -> Value {
    json!({
        "id": id,
        "processDefinitionId": "order-fulfilment:3:42",
        "processDefinitionKey": "order-fulfilment",
        "businessKey": "ORDER-1001",
        "startTime": "2024-03-01T10:15:30",
        "endTime": end_time,
        "suspended": suspended,
        "startUserId": "alice",
        "variables": {"amount": 125}
    })
}

pub fn task_json(id: &str, assignee: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": "Approve order",
        "assignee": assignee,
        "createTime": "2024-03-01T10:16:00Z",
        "processInstanceId": "inst-001",
        "processDefinitionId": "order-fulfilment:3:42",
        "candidateGroups": ["approvers"]
    })
}
