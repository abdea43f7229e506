//! The single HTTP path to the board service.
//!
//! Every request goes through [`Gateway::request`], which attaches the bearer
//! token from the [`SessionContext`] and turns any 401 into a session
//! teardown before the caller sees `ClientError::Unauthorized`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::session::SessionContext;
use crate::errors::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One outgoing call, already resolved to a path relative to the base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

/// A response with its status, whatever that status is.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over the wire for testability.
/// Real implementation: `HttpTransport`. Test double: `MockBackend`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Only failures to get any response are errors here;
    /// non-2xx statuses come back as an `ApiResponse`.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// `reqwest`-backed transport against a base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport {
                path: base_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        }
        .header("Accept", "application/json");

        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| ClientError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| ClientError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse { status, body })
    }
}

/// Shared client for all view controllers. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: SessionContext,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: SessionContext) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
            bearer: self.session.token(),
        };
        debug!(method = method.as_str(), path, "Sending request");

        let response = self.transport.send(request).await.inspect_err(|e| {
            warn!(method = method.as_str(), path, error = %e, "Request failed");
        })?;

        if response.status == 401 {
            self.session.expire();
            return Err(ClientError::Unauthorized);
        }
        if !response.is_success() {
            debug!(
                method = method.as_str(),
                path,
                status = response.status,
                "Request rejected"
            );
            return Err(ClientError::from_status(response.status, &response.body));
        }
        Ok(response.body)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        self.request(Method::Post, path, Some(to_body(path, body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        self.request(Method::Put, path, Some(to_body(path, body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        self.request(Method::Patch, path, Some(to_body(path, body)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::Delete, path, None).await
    }
}

fn to_body<B: Serialize + ?Sized>(path: &str, body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode {
        path: path.to_string(),
        message: format!("Failed to encode request body: {}", e),
    })
}
