//! OAuth2 resource owner password grant.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{token_from_response, AuthMethod, Authenticator, Credentials};
use crate::error::Error;
use crate::http::HttpClient;

/// Posts a form-encoded password grant and reads `access_token` from the response.
#[derive(Debug, Clone)]
pub struct OAuth2PasswordGrant {
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    grant_type: String,
    scope: Option<String>,
}

impl OAuth2PasswordGrant {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret,
            grant_type: "password".to_string(),
            scope: None,
        }
    }

    pub fn with_grant_type(mut self, grant_type: &str) -> Self {
        self.grant_type = grant_type.to_string();
        self
    }

    /// Scope sent with the grant. An empty scope is not sent.
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string()).filter(|s| !s.is_empty());
        self
    }

    fn form<'a>(&'a self, credentials: &'a Credentials) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![
            ("grant_type", self.grant_type.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("username", credentials.login.as_str()),
            ("password", credentials.password.expose_secret().as_str()),
        ];
        if let Some(scope) = &self.scope {
            form.push(("scope", scope.as_str()));
        }
        form
    }
}

#[async_trait]
impl Authenticator for OAuth2PasswordGrant {
    fn method(&self) -> AuthMethod {
        AuthMethod::OAuth2
    }

    fn endpoint(&self) -> &str {
        &self.token_url
    }

    async fn request_token(
        &self,
        http: &HttpClient,
        credentials: &Credentials,
    ) -> Result<Option<SecretString>, Error> {
        debug!(
            "Requesting OAuth2 token for {} from {}",
            credentials.login, self.token_url
        );

        let response = http
            .client()
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&self.form(credentials))
            .send()
            .await?;

        token_from_response(response, "access_token").await
    }
}
