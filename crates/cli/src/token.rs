//! SDK access token minting
//!
//! The token endpoint serves an HS256 JWT signed with the account auth
//! token. The SDK only accepts it with the `plivo;v=1` content type header
//! and voice permissions in the `per` claim.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// `cty` header value the SDK requires
pub const TOKEN_CONTENT_TYPE: &str = "plivo;v=1";

/// Default token lifetime
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePermissions {
    pub incoming_allow: bool,
    pub outgoing_allow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub voice: VoicePermissions,
}

/// Claims of an SDK access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,              // Auth ID
    pub sub: String,              // Endpoint username
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,      // Application ID
    pub per: Permissions,
}

/// Issues access tokens for one account
pub struct TokenMinter {
    auth_id: String,
    app_id: Option<String>,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
}

impl TokenMinter {
    pub fn new(auth_id: impl Into<String>, auth_token: &str) -> Self {
        let mut header = Header::new(Algorithm::HS256);
        header.cty = Some(TOKEN_CONTENT_TYPE.to_string());

        Self {
            auth_id: auth_id.into(),
            app_id: None,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            encoding_key: EncodingKey::from_secret(auth_token.as_bytes()),
            decoding_key: DecodingKey::from_secret(auth_token.as_bytes()),
            header,
        }
    }

    pub fn with_app_id(mut self, app_id: Option<String>) -> Self {
        self.app_id = app_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Claims for `username` issued at `now`
    pub fn claims_at(&self, username: &str, now: DateTime<Utc>) -> AccessClaims {
        let issued = now.timestamp();
        AccessClaims {
            iss: self.auth_id.clone(),
            sub: username.to_string(),
            exp: (now + self.ttl).timestamp(),
            nbf: issued,
            iat: issued,
            app: self.app_id.clone(),
            per: Permissions {
                voice: VoicePermissions {
                    incoming_allow: true,
                    outgoing_allow: true,
                },
            },
        }
    }

    pub fn mint(&self, username: &str) -> Result<String> {
        self.encode_claims(&self.claims_at(username, Utc::now()))
    }

    pub fn encode_claims(&self, claims: &AccessClaims) -> Result<String> {
        encode(&self.header, claims, &self.encoding_key).context("Failed to sign access token")
    }

    /// Verify a token signed by this account and return its claims
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .context("Access token rejected")?;
        Ok(data.claims)
    }
}
