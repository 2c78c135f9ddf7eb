//! Credential exchange strategies.
//!
//! An [`Authenticator`] trades a login and password for a bearer token. A rejected
//! exchange (non-2xx, or the token field missing) yields `Ok(None)`; only transport
//! failures are errors.

mod jwt;
mod oauth2;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use tracing::warn;

pub use jwt::JwtPasswordAuth;
pub use oauth2::OAuth2PasswordGrant;

use crate::error::Error;
use crate::http::HttpClient;

/// Supported authentication flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// JSON `{email, password}` login returning `{token}`.
    #[default]
    Jwt,
    /// Form-encoded OAuth2 password grant returning `{access_token}`.
    OAuth2,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthMethod::Jwt => write!(f, "jwt"),
            AuthMethod::OAuth2 => write!(f, "oauth2"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct AuthMethodParseError;

impl FromStr for AuthMethod {
    type Err = AuthMethodParseError;
    fn from_str(method: &str) -> Result<AuthMethod, Self::Err> {
        match method.to_lowercase().as_str() {
            "jwt" => Ok(AuthMethod::Jwt),
            "oauth2" | "oauth" => Ok(AuthMethod::OAuth2),
            _ => Err(AuthMethodParseError),
        }
    }
}

/// Login and password exchanged for a token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub login: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: SecretString::new(password.into()),
        }
    }
}

/// Trait for exchanging credentials for a bearer token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// The flow this authenticator implements.
    fn method(&self) -> AuthMethod;

    /// Absolute URL the exchange is posted to.
    fn endpoint(&self) -> &str;

    /// Post the credentials and extract the token from the response.
    ///
    /// # Returns
    ///
    /// `Some(token)` on success, `None` if the provider rejected the exchange.
    async fn request_token(
        &self,
        http: &HttpClient,
        credentials: &Credentials,
    ) -> Result<Option<SecretString>, Error>;
}

/// Reads `field` from a token response. Non-2xx statuses, bodies that are not JSON
/// and missing or empty fields all count as a rejection.
pub(crate) async fn token_from_response(
    response: reqwest::Response,
    field: &str,
) -> Result<Option<SecretString>, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Token exchange rejected with status {}: {}", status, body);
        return Ok(None);
    }

    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Token response is not valid JSON: {:?}", e);
            return Ok(None);
        }
    };

    match body.get(field).and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(Some(SecretString::new(token.to_string()))),
        _ => {
            warn!("Token response has no `{}` field", field);
            Ok(None)
        }
    }
}
