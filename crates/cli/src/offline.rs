//! Backend served in-process for `--offline` sessions

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use webphone_client_core::{CallBackend, ClientError, ClientResult, PrepareCallResponse, TokenResponse};

use crate::token::TokenMinter;

/// Mints tokens locally and allocates random call ids
pub struct OfflineBackend {
    minter: TokenMinter,
    username: String,
}

impl OfflineBackend {
    pub fn new(minter: TokenMinter, username: impl Into<String>) -> Self {
        Self {
            minter,
            username: username.into(),
        }
    }
}

#[async_trait]
impl CallBackend for OfflineBackend {
    async fn fetch_token(&self) -> ClientResult<TokenResponse> {
        let token = self
            .minter
            .mint(&self.username)
            .map_err(|e| ClientError::invalid_response(e.to_string()))?;
        Ok(TokenResponse { token: Some(token) })
    }

    async fn prepare_call(&self, phone_number: &str) -> ClientResult<PrepareCallResponse> {
        let call_id = Uuid::new_v4().to_string();
        debug!("Prepared offline call {} to {}", call_id, phone_number);
        Ok(PrepareCallResponse { call_id: Some(call_id) })
    }
}
