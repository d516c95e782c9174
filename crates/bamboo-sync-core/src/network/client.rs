//! HTTP client shared by the directory and archive clients.
//!
//! Wraps reqwest with:
//! - Bearer token injection once a token has been acquired
//! - Typed outcomes for lookups, where 404 is a branch rather than an error
//! - Upstream error capture including the response body

use crate::config::NetworkConfig;
use crate::{Result, SyncError};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Outcome of a lookup against a remote resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// HTTP client bound to one upstream service.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    /// Service name used in errors and logs ("bamboo", "keycloak").
    service: &'static str,
    bearer_token: Option<String>,
}

impl HttpClient {
    /// Create a new unauthenticated client for `service`.
    pub fn new(service: &'static str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| SyncError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            service,
            bearer_token: None,
        })
    }

    /// Copy of this client that sends `token` as a bearer credential.
    pub fn with_bearer_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            service: self.service,
            bearer_token: Some(token.to_string()),
        }
    }

    /// Same connection pool, reported under a different service name.
    pub fn for_service(&self, service: &'static str) -> Self {
        Self {
            client: self.client.clone(),
            service,
            bearer_token: self.bearer_token.clone(),
        }
    }

    pub(crate) fn service(&self) -> &'static str {
        self.service
    }

    /// GET a JSON document; any non-success status is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .send(Method::GET, url, self.request(Method::GET, url).query(query))
            .await?;
        decode(response).await
    }

    /// GET a JSON document where 404 means the resource does not exist.
    pub async fn lookup_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Lookup<T>> {
        let builder = self.request(Method::GET, url).query(query);
        let response = builder.send().await.map_err(|e| self.network_err(&Method::GET, url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} GET {} -> 404", self.service, url);
            return Ok(Lookup::NotFound);
        }

        let response = self.check_response_status(Method::GET, url, response).await?;
        Ok(Lookup::Found(decode(response).await?))
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(Method::POST, url, self.request(Method::POST, url).json(body))
            .await?;
        decode(response).await
    }

    /// PATCH a JSON body; the response body is ignored.
    pub async fn patch_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        self.send(Method::PATCH, url, self.request(Method::PATCH, url).json(body))
            .await?;
        Ok(())
    }

    /// POST an urlencoded form and decode the JSON response.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .send(Method::POST, url, self.request(Method::POST, url).form(form))
            .await?;
        decode(response).await
    }

    /// POST a multipart form; the response body is ignored.
    pub async fn post_multipart(&self, url: &str, form: reqwest::multipart::Form) -> Result<()> {
        self.send(Method::POST, url, self.request(Method::POST, url).multipart(form))
            .await?;
        Ok(())
    }

    // Internal methods

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: Method, url: &str, builder: RequestBuilder) -> Result<Response> {
        debug!("{} {} {}", self.service, method, url);
        let response = builder
            .send()
            .await
            .map_err(|e| self.network_err(&method, url, e))?;
        self.check_response_status(method, url, response).await
    }

    fn network_err(&self, method: &Method, url: &str, err: reqwest::Error) -> SyncError {
        SyncError::Network {
            message: format!("{} {} {} failed: {}", self.service, method, url, err),
            source: Some(err),
        }
    }

    async fn check_response_status(
        &self,
        method: Method,
        url: &str,
        response: Response,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(SyncError::Upstream {
            service: self.service.to_string(),
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body: parse_error_body(&text),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Interpret an error body: JSON when it parses, otherwise the raw text.
pub(crate) fn parse_error_body(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(trimmed)
            .unwrap_or_else(|_| serde_json::Value::String(trimmed.to_string())),
    )
}

/// Join a base URL and an absolute API path.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
