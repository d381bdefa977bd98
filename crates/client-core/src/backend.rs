//! Backend endpoints consumed by the controller
//!
//! Two plain JSON `POST` requests: one fetches the SDK access token, the
//! other prepares an outbound call and returns the identifier the SDK call
//! is correlated with. There is no retry and no status-specific handling;
//! any non-success status becomes [`ClientError::RequestFailed`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::client::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Body of the token endpoint response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenResponse {
    /// The access token, or [`ClientError::MissingToken`] when absent or empty
    pub fn into_token(self) -> ClientResult<String> {
        self.token
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::MissingToken)
    }
}

/// Body of the call-preparation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareCallRequest {
    /// `+`-prefixed destination number
    pub phone_number: String,
}

/// Body of the call-preparation response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareCallResponse {
    #[serde(default)]
    pub call_id: Option<String>,
}

impl PrepareCallResponse {
    /// The prepared call id, or [`ClientError::MissingCallId`] when absent or empty
    pub fn into_call_id(self) -> ClientResult<String> {
        self.call_id
            .filter(|call_id| !call_id.is_empty())
            .ok_or(ClientError::MissingCallId)
    }
}

/// The two backend calls the controller depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallBackend: Send + Sync {
    /// Fetch an SDK access token
    async fn fetch_token(&self) -> ClientResult<TokenResponse>;

    /// Allocate an outbound call to `phone_number`
    async fn prepare_call(&self, phone_number: &str) -> ClientResult<PrepareCallResponse>;
}

/// [`CallBackend`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    token_url: String,
    prepare_call_url: String,
}

impl HttpBackend {
    pub fn new(token_url: impl Into<String>, prepare_call_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), token_url, prepare_call_url)
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots...)
    pub fn with_client(
        client: reqwest::Client,
        token_url: impl Into<String>,
        prepare_call_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            prepare_call_url: prepare_call_url.into(),
        }
    }

    /// Backend for the endpoints named in `config`
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.token_url.clone(), config.prepare_call_url.clone())
    }

    async fn post<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder, url: &str) -> ClientResult<T> {
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ClientError::network(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        debug!("POST {} -> {}", url, status);
        if !status.is_success() {
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::invalid_response(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl CallBackend for HttpBackend {
    async fn fetch_token(&self) -> ClientResult<TokenResponse> {
        let request = self.client.post(&self.token_url);
        self.post(request, &self.token_url).await
    }

    async fn prepare_call(&self, phone_number: &str) -> ClientResult<PrepareCallResponse> {
        let body = PrepareCallRequest {
            phone_number: phone_number.to_string(),
        };
        let request = self.client.post(&self.prepare_call_url).json(&body);
        self.post(request, &self.prepare_call_url).await
    }
}
