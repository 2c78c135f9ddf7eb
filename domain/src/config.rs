//! Per-provider connection settings consumed by [`crate::ApiClient`].

use chrono::Duration;
use platform_auth::strategy::{
    AuthMethod, Authenticator, Credentials, JwtPasswordAuth, OAuth2PasswordGrant,
};
use secrecy::SecretString;
use service::config::DEFAULT_TOKEN_LIFETIME_MINUTES;

use crate::error::Error;

/// Default resource format (URI extension).
pub const DEFAULT_FORMAT: &str = "jsonld";
/// Default `Accept` and `Content-Type` media type.
pub const JSON_LD: &str = "application/ld+json";
pub const JSON: &str = "application/json";
/// `Content-Type` of PATCH requests.
pub const MERGE_PATCH_JSON: &str = "application/merge-patch+json";
/// Authentication URI used when the provider does not set one.
pub const DEFAULT_AUTH_URI: &str = "auth";

/// OAuth2 client settings for the password grant.
#[derive(Debug, Clone)]
pub struct OAuth2Settings {
    pub client_id: String,
    pub client_secret: SecretString,
    pub scope: String,
    pub grant_type: String,
}

impl OAuth2Settings {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            scope: String::new(),
            grant_type: "password".to_string(),
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }
}

/// Everything the generic client needs to talk to one provider.
///
/// Built with [`ProviderConfig::new`] and the `with_*` methods. The API URL always
/// ends with a `/` and the auth URI never starts or ends with one.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    name: String,
    api_url: String,
    format: String,
    concat_format: bool,
    accept: String,
    content_type: String,
    has_authentication: bool,
    auth_method: AuthMethod,
    auth_uri: String,
    overridden_auth_url: Option<String>,
    credentials: Option<Credentials>,
    oauth2: Option<OAuth2Settings>,
    token_lifetime: Duration,
}

impl ProviderConfig {
    /// A provider without authentication, speaking JSON-LD with the `.jsonld` suffix.
    pub fn new(name: &str, api_url: &str) -> Self {
        Self {
            name: name.to_string(),
            api_url: normalize_api_url(api_url),
            format: DEFAULT_FORMAT.to_string(),
            concat_format: true,
            accept: JSON_LD.to_string(),
            content_type: JSON_LD.to_string(),
            has_authentication: false,
            auth_method: AuthMethod::Jwt,
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            overridden_auth_url: None,
            credentials: None,
            oauth2: None,
            token_lifetime: Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES),
        }
    }

    /// Resource format and whether GET URIs get the `.format` suffix.
    pub fn with_format(mut self, format: &str, concat_format: bool) -> Self {
        self.format = format.to_string();
        self.concat_format = concat_format;
        self
    }

    pub fn with_media_types(mut self, accept: &str, content_type: &str) -> Self {
        self.accept = accept.to_string();
        self.content_type = content_type.to_string();
        self
    }

    /// Enable JWT password login with `credentials`.
    pub fn with_jwt_auth(mut self, credentials: Credentials) -> Self {
        self.has_authentication = true;
        self.auth_method = AuthMethod::Jwt;
        self.credentials = Some(credentials);
        self
    }

    /// Enable the OAuth2 password grant with `credentials` and the client `settings`.
    pub fn with_oauth2_auth(mut self, credentials: Credentials, settings: OAuth2Settings) -> Self {
        self.has_authentication = true;
        self.auth_method = AuthMethod::OAuth2;
        self.credentials = Some(credentials);
        self.oauth2 = Some(settings);
        self
    }

    pub fn with_auth_uri(mut self, auth_uri: &str) -> Self {
        self.auth_uri = auth_uri.trim_matches('/').to_string();
        self
    }

    /// Absolute token URL used instead of the auth URI, for providers whose token
    /// endpoint lives outside the API URL. An empty URL clears the override.
    pub fn with_overridden_auth_url(mut self, url: &str) -> Self {
        self.overridden_auth_url = Some(url.to_string()).filter(|u| !u.is_empty());
        self
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn concat_format(&self) -> bool {
        self.concat_format
    }

    pub fn accept(&self) -> &str {
        &self.accept
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn has_authentication(&self) -> bool {
        self.has_authentication
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    pub fn auth_uri(&self) -> &str {
        &self.auth_uri
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    /// URL the credential exchange is posted to.
    pub fn auth_url(&self) -> String {
        match (&self.overridden_auth_url, self.auth_method) {
            (Some(url), AuthMethod::OAuth2) => url.clone(),
            _ => format!("{}{}", self.api_url, self.auth_uri),
        }
    }

    /// True when `uri` designates the credential exchange endpoint.
    pub fn is_auth_uri(&self, uri: &str) -> bool {
        uri.trim_matches('/') == self.auth_uri || uri == self.auth_url()
    }

    /// The credential exchange matching the configured auth method.
    pub fn authenticator(&self) -> Result<Box<dyn Authenticator>, Error> {
        match self.auth_method {
            AuthMethod::Jwt => Ok(Box::new(
                JwtPasswordAuth::new(self.auth_url())
                    .with_media_types(&self.accept, &self.content_type),
            )),
            AuthMethod::OAuth2 => {
                let settings = self.oauth2.as_ref().ok_or_else(|| {
                    Error::config(&format!("{}: OAuth2 client settings missing", self.name))
                })?;
                Ok(Box::new(
                    OAuth2PasswordGrant::new(
                        self.auth_url(),
                        settings.client_id.clone(),
                        settings.client_secret.clone(),
                    )
                    .with_grant_type(&settings.grant_type)
                    .with_scope(&settings.scope),
                ))
            }
        }
    }
}

fn normalize_api_url(api_url: &str) -> String {
    format!("{}/", api_url.trim_end_matches('/'))
}
