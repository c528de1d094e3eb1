//! HTTP client for the storefront REST API.
//!
//! Wraps `reqwest` with base-URL handling, bearer-token management and
//! uniform error mapping. Every non-2xx response becomes an [`ApiError`]
//! carrying the server's own `message`/`detail` text when it sent one.

use std::time::Duration;

use nukesul_core::{AppConfig, ListEnvelope};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Whether a request needs the admin bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Public,
    Admin,
}

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the underlying connection pool. Use
/// [`ApiClient::with_token`] to derive a client that can call admin
/// endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if the configured base
    /// URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            token: None,
        })
    }

    /// Returns a copy of this client that sends `token` on admin requests.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an API path such as `api/public/branches/` against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join path \"{path}\": {e}"),
            })
    }

    /// Starts a request, attaching the bearer token for admin access.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] for admin access without a token.
    pub(crate) fn request(
        &self,
        method: Method,
        url: &Url,
        access: Access,
    ) -> Result<RequestBuilder, ApiError> {
        let builder = self
            .client
            .request(method, url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        match access {
            Access::Public => Ok(builder),
            Access::Admin => {
                let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
                Ok(builder.bearer_auth(token))
            }
        }
    }

    /// Sends a request and maps non-2xx statuses to typed errors.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or timeout.
    /// - [`ApiError::Unauthorized`] on 401/403.
    /// - [`ApiError::Status`] on any other non-2xx status.
    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
        url: &Url,
    ) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "api response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_owned()
        });
        tracing::warn!(url = %url, status = status.as_u16(), %message, "api request failed");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }

    /// Reads a response body and deserializes it as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Deserialize`] if the body does not match `T`.
    pub(crate) async fn decode<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Fetches a collection endpoint that answers with a bare array or a
    /// `{"results": [...]}` object.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::send`] errors and returns
    /// [`ApiError::Deserialize`] for any other body shape.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "fetching collection");
        let builder = self.request(Method::GET, &url, access)?;
        let response = self.send(builder, &url).await?;
        let envelope: ListEnvelope<T> = Self::decode(response, &format!("GET {path}")).await?;
        let items = envelope.into_vec();
        tracing::debug!(url = %url, count = items.len(), "collection loaded");
        Ok(items)
    }

    /// Sends a body-less request (typically DELETE) and discards the response.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        path: &str,
        access: Access,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        let builder = self.request(method, &url, access)?;
        self.send(builder, &url).await?;
        Ok(())
    }

    /// Sends a JSON body and returns the successful response.
    pub(crate) async fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        access: Access,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(path)?;
        let builder = self.request(method, &url, access)?.json(body);
        self.send(builder, &url).await
    }
}

/// Extracts a human-readable message from an error body.
///
/// Looks for `message`, `detail` or `error` string fields; falls back to a
/// short non-JSON body verbatim.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "detail", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
            .map(str::to_owned);
    }
    if trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return Some(trimmed.to_owned());
    }
    None
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
