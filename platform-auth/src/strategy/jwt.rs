//! JWT password login.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use super::{token_from_response, AuthMethod, Authenticator, Credentials};
use crate::error::Error;
use crate::http::HttpClient;

/// Request body of a JWT login.
#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Posts `{email, password}` as JSON and reads `token` from the response.
#[derive(Debug, Clone)]
pub struct JwtPasswordAuth {
    auth_url: String,
    accept: String,
    content_type: String,
}

impl JwtPasswordAuth {
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            accept: "application/json".to_string(),
            content_type: "application/json".to_string(),
        }
    }

    /// Headers sent with the login; JSON-LD APIs expect their own media types here.
    pub fn with_media_types(mut self, accept: &str, content_type: &str) -> Self {
        self.accept = accept.to_string();
        self.content_type = content_type.to_string();
        self
    }
}

#[async_trait]
impl Authenticator for JwtPasswordAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Jwt
    }

    fn endpoint(&self) -> &str {
        &self.auth_url
    }

    async fn request_token(
        &self,
        http: &HttpClient,
        credentials: &Credentials,
    ) -> Result<Option<SecretString>, Error> {
        debug!("Requesting JWT for {} from {}", credentials.login, self.auth_url);

        let request = LoginRequest {
            email: &credentials.login,
            password: credentials.password.expose_secret(),
        };

        let response = http
            .client()
            .post(&self.auth_url)
            .header(ACCEPT, &self.accept)
            .header(CONTENT_TYPE, &self.content_type)
            .json(&request)
            .send()
            .await?;

        token_from_response(response, "token").await
    }
}
