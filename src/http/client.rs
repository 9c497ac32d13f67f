use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::engine::page::{Page, PageBody, PageRequest};
use crate::engine::retry::RetryPolicy;
use crate::engine::{Credential, EngineError};

/// Settings needed to talk to one engine.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// API root, e.g. `https://engine.example.com/api/v1`.
    pub base_url: String,
    pub timeout: Duration,
    pub requests_per_second: u32,
    pub burst: u32,
    pub retry: RetryPolicy,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout: Duration::from_secs(30),
            requests_per_second: 20,
            burst: 40,
            retry: RetryPolicy::default(),
        }
    }
}

/// Rate-limited HTTP transport for the engine API.
///
/// Reads are retried per [`RetryPolicy`]; every other method is sent exactly
/// once. Non-success responses become [`EngineError`]s carrying the engine's
/// message.
#[derive(Debug, Clone)]
pub struct EngineTransport {
    http: reqwest::Client,
    base_url: Url,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl EngineTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, EngineError> {
        let base_url = Url::parse(settings.base_url.trim_end_matches('/')).map_err(|e| {
            EngineError::Config(format!("invalid base url '{}': {e}", settings.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(EngineError::Config(format!(
                "base url '{}' cannot carry paths",
                settings.base_url
            )));
        }

        let per_second = NonZeroU32::new(settings.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(settings.burst).unwrap_or(per_second);
        let rate_limiter = Arc::new(RateLimiter::direct(
            Quota::per_second(per_second).allow_burst(burst),
        ));

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("flowctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            rate_limiter,
            retry: settings.retry,
            timeout: settings.timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Each segment is
    /// percent-encoded, so ids never alter the path structure.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET and decode JSON, with retries.
    pub async fn get_json<T>(
        &self,
        credential: &Credential,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, EngineError>
    where
        T: DeserializeOwned,
    {
        let operation = describe(&Method::GET, segments);
        let operation = operation.as_str();
        self.retry
            .run(operation, || async move {
                let request = self.request(Method::GET, segments).query(query);
                let response = self.dispatch(credential, request, operation).await?;
                required(operation, read_json(operation, response).await?)
            })
            .await
    }

    /// GET a raw text body (diagram XML), with retries.
    pub async fn get_text(
        &self,
        credential: &Credential,
        segments: &[&str],
    ) -> Result<String, EngineError> {
        let operation = describe(&Method::GET, segments);
        let operation = operation.as_str();
        self.retry
            .run(operation, || async move {
                let request = self.request(Method::GET, segments);
                let response = self.dispatch(credential, request, operation).await?;
                response
                    .text()
                    .await
                    .map_err(|e| EngineError::transport(operation, e, self.timeout_ms()))
            })
            .await
    }

    /// GET a list endpoint, accepting both a bare array and an envelope.
    pub async fn get_page<T>(
        &self,
        credential: &Credential,
        segments: &[&str],
        page: PageRequest,
        filters: &[(&str, String)],
    ) -> Result<Page<T>, EngineError>
    where
        T: DeserializeOwned,
    {
        let mut query = page.query();
        query.extend(filters.iter().map(|(k, v)| (*k, v.clone())));
        let body: PageBody<T> = self.get_json(credential, segments, &query).await?;
        Ok(body.into_page(page))
    }

    /// Send a JSON body once. Returns `None` for empty (204) responses.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        credential: &Credential,
        segments: &[&str],
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Option<T>, EngineError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let operation = describe(&method, segments);
        let request = self.request(method, segments).query(query).json(body);
        let response = self.dispatch(credential, request, &operation).await?;
        read_json(&operation, response).await
    }

    /// Send a body-less request once. Returns `None` for empty (204) responses.
    pub async fn send_empty<T>(
        &self,
        method: Method,
        credential: &Credential,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Option<T>, EngineError>
    where
        T: DeserializeOwned,
    {
        let operation = describe(&method, segments);
        let request = self.request(method, segments).query(query);
        let response = self.dispatch(credential, request, &operation).await?;
        read_json(&operation, response).await
    }

    /// POST a raw text document (XML) once.
    pub async fn send_text<T>(
        &self,
        credential: &Credential,
        segments: &[&str],
        body: String,
        content_type: &str,
    ) -> Result<Option<T>, EngineError>
    where
        T: DeserializeOwned,
    {
        let operation = describe(&Method::POST, segments);
        let request = self
            .request(Method::POST, segments)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);
        let response = self.dispatch(credential, request, &operation).await?;
        read_json(&operation, response).await
    }

    /// POST a multipart form once.
    pub async fn send_multipart<T>(
        &self,
        credential: &Credential,
        segments: &[&str],
        form: Form,
    ) -> Result<Option<T>, EngineError>
    where
        T: DeserializeOwned,
    {
        let operation = describe(&Method::POST, segments);
        let request = self.request(Method::POST, segments).multipart(form);
        let response = self.dispatch(credential, request, &operation).await?;
        read_json(&operation, response).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.endpoint(segments))
    }

    async fn dispatch(
        &self,
        credential: &Credential,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Response, EngineError> {
        self.rate_limiter.until_ready().await;

        debug!(operation, anonymous = credential.is_anonymous(), "Sending engine request");
        let response = credential
            .apply(request)
            .send()
            .await
            .map_err(|e| EngineError::transport(operation, e, self.timeout_ms()))?;

        let status = response.status();
        if status.is_success() {
            debug!(operation, status = status.as_u16(), "Engine request succeeded");
            return Ok(response);
        }

        let body = error_body(operation, status.as_u16(), response.text().await);
        let error = EngineError::from_status(status.as_u16(), &body, operation);
        warn!(operation, status = status.as_u16(), error = %error, "Engine request failed");
        Err(error)
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

fn describe(method: &Method, segments: &[&str]) -> String {
    format!("{method} /{}", segments.join("/"))
}

/// Body of a failed response. An unreadable body is logged and treated as
/// empty, so the error falls back to the generic HTTP status message.
fn error_body<E: std::fmt::Display>(operation: &str, status: u16, read: Result<String, E>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            warn!(operation, status, error = %e, "Could not read engine error body");
            String::new()
        }
    }
}

async fn read_json<T>(operation: &str, response: Response) -> Result<Option<T>, EngineError>
where
    T: DeserializeOwned,
{
    let text = response.text().await.map_err(|e| EngineError::Decode {
        operation: operation.to_string(),
        message: e.to_string(),
    })?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| EngineError::Decode {
            operation: operation.to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn required<T>(operation: &str, value: Option<T>) -> Result<T, EngineError> {
    value.ok_or_else(|| EngineError::Decode {
        operation: operation.to_string(),
        message: "expected a response body but the engine sent none".to_string(),
    })
}
