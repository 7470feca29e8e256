// src/api/auth.rs
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use std::{env, fmt};
use tracing::{info, instrument};
use url::Url;

use crate::error::{PriceSyncError, Result};

pub const CLIENT_ID_VAR: &str = "ONLINER_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "ONLINER_CLIENT_SECRET";

/// OAuth2 client credentials for the marketplace API.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read `ONLINER_CLIENT_ID` / `ONLINER_CLIENT_SECRET` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve both secrets through `lookup`; missing or blank values fail.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(PriceSyncError::AuthConfig(name))
        };
        Ok(Self::new(read(CLIENT_ID_VAR)?, read(CLIENT_SECRET_VAR)?))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Access token returned by the client-credentials grant.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Trade client credentials for a bearer token (`grant_type=client_credentials`,
/// credentials in an HTTP Basic header).
#[instrument(level = "info", skip(client, credentials), fields(url = %token_url, client_id = %credentials.client_id()))]
pub async fn exchange_token(
    client: &Client,
    token_url: &Url,
    credentials: &Credentials,
) -> Result<BearerToken> {
    let resp = client
        .post(token_url.clone())
        .basic_auth(credentials.client_id(), Some(&credentials.client_secret))
        .header(ACCEPT, "application/json")
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(PriceSyncError::Auth { status, body });
    }

    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| PriceSyncError::Auth {
            status,
            body: format!("unreadable token response ({}): {}", e, body),
        })?;
    info!(expires_in = ?token.expires_in, "obtained access token");
    Ok(BearerToken(token.access_token))
}
