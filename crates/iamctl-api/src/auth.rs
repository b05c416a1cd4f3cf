use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::client::ErrorBody;
use crate::error::Error;

/// How requests to a service are authenticated.
///
/// Each variant carries the secret material needed for its flow.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// IBM Cloud API key, exchanged for a short-lived bearer token at
    /// `token_url` (`POST /identity/token`).
    IamApiKey { api_key: SecretString, token_url: Url },

    /// Pre-issued bearer token, sent as-is.
    BearerToken(SecretString),

    /// No `Authorization` header at all (local mocks, test endpoints).
    NoAuth,
}

impl Credentials {
    /// Build IAM API-key credentials from an IAM host such as
    /// `https://iam.cloud.ibm.com`. A URL that already names the token
    /// endpoint is used unchanged.
    pub fn iam(api_key: SecretString, auth_url: &str) -> Result<Self, Error> {
        let trimmed = auth_url.trim_end_matches('/');
        let token_url = if trimmed.ends_with("/identity/token") {
            Url::parse(trimmed)?
        } else {
            Url::parse(&format!("{trimmed}/identity/token"))?
        };
        Ok(Self::IamApiKey { api_key, token_url })
    }

    /// Short label for logs and diagnostics. Never includes secrets.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IamApiKey { .. } => "iam",
            Self::BearerToken(_) => "bearertoken",
            Self::NoAuth => "noauth",
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Produces the `Authorization` header for a service.
///
/// The IAM token is fetched lazily on first use and reused for the rest of
/// the invocation; an invocation makes at most two service calls, well
/// inside the token lifetime.
#[derive(Debug)]
pub struct Authenticator {
    credentials: Credentials,
    token: OnceCell<SecretString>,
}

impl Authenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token: OnceCell::new(),
        }
    }

    pub fn no_auth() -> Self {
        Self::new(Credentials::NoAuth)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The full `Authorization` header value, or `None` for [`Credentials::NoAuth`].
    pub async fn authorization(&self, http: &reqwest::Client) -> Result<Option<SecretString>, Error> {
        match &self.credentials {
            Credentials::NoAuth => Ok(None),
            Credentials::BearerToken(token) => Ok(Some(SecretString::from(format!(
                "Bearer {}",
                token.expose_secret()
            )))),
            Credentials::IamApiKey { api_key, token_url } => {
                let token = self
                    .token
                    .get_or_try_init(|| exchange_api_key(http, api_key, token_url))
                    .await?;
                Ok(Some(SecretString::from(format!(
                    "Bearer {}",
                    token.expose_secret()
                ))))
            }
        }
    }
}

/// Trade an API key for an IAM access token.
async fn exchange_api_key(
    http: &reqwest::Client,
    api_key: &SecretString,
    token_url: &Url,
) -> Result<SecretString, Error> {
    debug!("POST {token_url} (apikey grant)");

    let resp = http
        .post(token_url.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[
            ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
            ("apikey", api_key.expose_secret()),
        ])
        .send()
        .await?;

    let status = resp.status();
    let raw = resp.text().await?;

    if !status.is_success() {
        let message = ErrorBody::parse(&raw)
            .message
            .unwrap_or_else(|| format!("token request failed with HTTP {}", status.as_u16()));
        return Err(Error::Authentication { message });
    }

    let token: TokenResponse = serde_json::from_str(&raw).map_err(|e| Error::Authentication {
        message: format!("malformed token response: {e}"),
    })?;

    if let Some(kind) = token.token_type.as_deref() {
        if !kind.eq_ignore_ascii_case("bearer") {
            debug!(token_type = kind, "unexpected IAM token type");
        }
    }

    Ok(SecretString::from(token.access_token))
}
