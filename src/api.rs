//! API client for the Control Room REST surface
//!
//! Hides token management and response-shape variance: every request comes
//! back as an [`ApiResponse`] with status, normalized body, and headers.
//! Non-2xx statuses are values, not errors; only transport failures
//! (connection refused, timeout) propagate as errors.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{HarnessError, HarnessResult};
use crate::session::TokenStore;

const LOGIN_ENDPOINT: &str = "/api/login";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Normalized response body: structured JSON when it parses, raw text
/// otherwise. Deliberately a tagged variant, never an untyped field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// A single normalized HTTP response. Immutable after creation.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as JSON, if it parsed as JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// The raw-text fallback body, if JSON parsing failed.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }

    /// Convenience accessor for a top-level string field of a JSON body.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.json()?.get(name)?.as_str()
    }
}

enum ClientState {
    Uninitialized,
    Ready {
        http: reqwest::Client,
        tokens: TokenStore,
    },
    Disposed,
}

/// Authenticated HTTP client for the application's API.
///
/// `init` must be called exactly once before any request; `dispose`
/// releases the transport and makes further calls fail.
pub struct ApiClient {
    base_url: String,
    state: ClientState,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            state: ClientState::Uninitialized,
        }
    }

    /// Build the underlying transport. Must precede any other operation.
    pub fn init(&mut self) -> HarnessResult<()> {
        match self.state {
            ClientState::Disposed => Err(HarnessError::ClientDisposed),
            _ => {
                let http = reqwest::Client::builder()
                    .timeout(REQUEST_TIMEOUT)
                    .build()?;
                self.state = ClientState::Ready {
                    http,
                    tokens: TokenStore::new(),
                };
                Ok(())
            }
        }
    }

    /// Release the transport. Further calls fail with `ClientDisposed`.
    pub fn dispose(&mut self) {
        self.state = ClientState::Disposed;
    }

    fn transport(&self) -> HarnessResult<(&reqwest::Client, &TokenStore)> {
        match &self.state {
            ClientState::Uninitialized => Err(HarnessError::ClientNotInitialized),
            ClientState::Disposed => Err(HarnessError::ClientDisposed),
            ClientState::Ready { http, tokens } => Ok((http, tokens)),
        }
    }

    fn tokens_mut(&mut self) -> HarnessResult<&mut TokenStore> {
        match &mut self.state {
            ClientState::Uninitialized => Err(HarnessError::ClientNotInitialized),
            ClientState::Disposed => Err(HarnessError::ClientDisposed),
            ClientState::Ready { tokens, .. } => Ok(tokens),
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) -> HarnessResult<()> {
        self.tokens_mut()?.set(token);
        Ok(())
    }

    pub fn token(&self) -> HarnessResult<Option<String>> {
        Ok(self.transport()?.1.get().map(String::from))
    }

    pub fn clear_token(&mut self) -> HarnessResult<()> {
        self.tokens_mut()?.clear();
        Ok(())
    }

    /// Authenticate against the fixed login endpoint.
    ///
    /// Non-2xx is a hard failure and leaves no token behind. On success the
    /// `token` field of the response body is stored and returned.
    pub async fn login(&mut self, username: &str, password: &str) -> HarnessResult<String> {
        let payload = json!({ "username": username, "password": password });
        let response = self
            .request(Method::POST, LOGIN_ENDPOINT, Some(&payload), None)
            .await?;

        if !response.is_success() {
            self.tokens_mut()?.clear();
            return Err(HarnessError::AuthenticationRejected {
                status: response.status,
            });
        }

        let token = response
            .str_field("token")
            .ok_or(HarnessError::TokenMissing)?
            .to_string();

        self.tokens_mut()?.set(&token);
        info!("API login succeeded for {}", username);
        Ok(token)
    }

    pub async fn get(&self, endpoint: &str) -> HarnessResult<ApiResponse> {
        self.request(Method::GET, endpoint, None, None).await
    }

    /// GET with query parameters, for paged list endpoints.
    pub async fn get_query(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> HarnessResult<ApiResponse> {
        self.request(Method::GET, endpoint, None, Some(params)).await
    }

    pub async fn post(&self, endpoint: &str, payload: &Value) -> HarnessResult<ApiResponse> {
        self.request(Method::POST, endpoint, Some(payload), None).await
    }

    pub async fn put(&self, endpoint: &str, payload: &Value) -> HarnessResult<ApiResponse> {
        self.request(Method::PUT, endpoint, Some(payload), None).await
    }

    pub async fn patch(&self, endpoint: &str, payload: &Value) -> HarnessResult<ApiResponse> {
        self.request(Method::PATCH, endpoint, Some(payload), None).await
    }

    pub async fn delete(&self, endpoint: &str) -> HarnessResult<ApiResponse> {
        self.request(Method::DELETE, endpoint, None, None).await
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
        query: Option<&[(&str, &str)]>,
    ) -> HarnessResult<ApiResponse> {
        let (http, tokens) = self.transport()?;
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("{} {}", method, url);

        let mut builder = http.request(method, &url);
        if let Some(params) = query {
            builder = builder.query(params);
        }
        if let Some(body) = payload {
            builder = builder.json(body);
        }
        // No token means no authorization header at all; the server's own
        // 401 must come through as a normal response value.
        if let Some(bearer) = tokens.bearer() {
            builder = builder.header(AUTHORIZATION, bearer);
        }

        let response = builder.send().await?;
        Self::normalize(response).await
    }

    async fn normalize(response: reqwest::Response) -> HarnessResult<ApiResponse> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let bytes = response.bytes().await?;
        let body = match serde_json::from_slice(&bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
        };

        Ok(ApiResponse {
            status,
            body,
            headers,
        })
    }
}
