//! Transports that execute an `HttpRequest` and hand back an `HttpResponse`.
//!
//! # Design
//! A transport only reports whether a response arrived. Non-2xx statuses
//! come back as data so `CarSpaClient` decides how to interpret them; a
//! failure to get any response at all becomes `ApiError::Network`.
//! Interceptors such as `LoggingTransport` wrap another transport.

use std::time::Instant;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Transport backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sort a reqwest failure into "never got a response" versus anything else.
fn classify(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::Unknown(e.to_string())
    } else if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() {
        ApiError::Network(e.to_string())
    } else {
        ApiError::Unknown(e.to_string())
    }
}

/// Interceptor that traces every exchange of the wrapped transport.
///
/// Only the method, URL, status and latency are recorded. Headers and bodies
/// are left out since they carry the bearer token and payment images.
#[derive(Debug, Clone)]
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        let started = Instant::now();
        tracing::debug!(method, url = %url, "sending request");

        let result = self.inner.execute(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) if response.is_success() => {
                tracing::debug!(method, url = %url, status = response.status, elapsed_ms, "request completed");
            }
            Ok(response) => {
                tracing::warn!(method, url = %url, status = response.status, elapsed_ms, "request rejected");
            }
            Err(e) => {
                tracing::warn!(method, url = %url, kind = e.kind(), elapsed_ms, error = %e, "request failed");
            }
        }
        result
    }
}
