//! The generic API client shared by every provider.
//!
//! An [`ApiClient`] is built from a [`ProviderConfig`] and a token store. Construction
//! sweeps expired tokens and, when the provider requires it, authenticates with the
//! configured credentials. Every verb then attaches the bearer token, and a 401 answer
//! evicts the cached token for the current (login, API URL) pair.

use std::sync::Arc;

use log::*;
use platform_auth::{
    http::HttpClient,
    strategy::Credentials,
    token::{TokenManager, TokenStore},
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::{ProviderConfig, MERGE_PATCH_JSON};
use crate::error::{Error, ExternalErrorKind};
use crate::hydra::{self, Pagination};
use crate::query::Query;

/// Result of a GET on a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    /// `hydra:member` when present, the whole body otherwise.
    pub members: Value,
    pub pagination: Pagination,
}

/// Envelope returned by the write verbs.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResponse {
    /// HTTP status code.
    pub code: u16,
    /// Parsed body, only for the statuses the verb expects one for.
    pub body: Option<Value>,
}

impl WriteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// A file sent in a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Request payload. The variant decides the `Content-Type`.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    /// Sent with the provider's content type (merge-patch for PATCH).
    Json(Value),
    /// `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` with text fields and files.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

pub struct ApiClient {
    config: ProviderConfig,
    http: HttpClient,
    tokens: TokenManager,
    login: Option<String>,
    token: Option<SecretString>,
}

impl ApiClient {
    /// Build a client for `config`.
    ///
    /// Tokens older than the provider's lifetime are swept from `store` first. When the
    /// provider requires authentication, the configured credentials are exchanged (or a
    /// cached token reused). A rejected exchange leaves the client unauthenticated.
    pub async fn connect(
        config: ProviderConfig,
        store: Arc<dyn TokenStore>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let tokens = TokenManager::new(store, config.token_lifetime());
        tokens.sweep().await?;

        let mut client = Self {
            login: config.credentials().map(|c| c.login.clone()),
            config,
            http,
            tokens,
            token: None,
        };

        if client.config.has_authentication() {
            client.authenticate().await?;
        }

        Ok(client)
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// True when a bearer token is held, or the provider needs none.
    pub fn is_authenticated(&self) -> bool {
        !self.config.has_authentication() || self.token.is_some()
    }

    /// The bearer token currently held.
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Authenticate with the configured credentials. Providers without
    /// authentication are always considered authenticated.
    pub async fn authenticate(&mut self) -> Result<bool, Error> {
        if !self.config.has_authentication() {
            return Ok(true);
        }

        match self.config.credentials().cloned() {
            Some(credentials) => self.authenticate_with(credentials).await,
            None => {
                warn!(
                    "{}: authentication required but no credentials configured",
                    self.config.name()
                );
                Ok(false)
            }
        }
    }

    /// Authenticate with `credentials` instead of the configured ones. Later evictions
    /// apply to the new login.
    pub async fn authenticate_with(&mut self, credentials: Credentials) -> Result<bool, Error> {
        if !self.config.has_authentication() {
            return Ok(true);
        }

        let authenticator = self.config.authenticator()?;
        self.login = Some(credentials.login.clone());
        self.token = self
            .tokens
            .obtain(
                authenticator.as_ref(),
                &self.http,
                self.config.api_url(),
                &credentials,
            )
            .await?;

        Ok(self.is_authenticated())
    }

    /// GET a list endpoint. Returns `hydra:member` (or the body) with pagination hints.
    pub async fn get(&mut self, uri: &str, query: &Query) -> Result<Collection, Error> {
        let url = self.with_format(uri)?;
        let body = self.read(uri, &url, query).await?;

        let pagination = Pagination::from_body(&body);
        Ok(Collection {
            members: hydra::members(body),
            pagination,
        })
    }

    /// GET `uri/id`.
    pub async fn get_single(&mut self, uri: &str, id: &str, query: &Query) -> Result<Value, Error> {
        let uri = join_id(uri, id)?;
        let url = self.url_for(&uri)?;
        let body = self.read(&uri, &url, query).await?;

        Ok(hydra::members(body))
    }

    /// POST. The body is parsed for 200 and 201.
    pub async fn post(&mut self, uri: &str, query: &Query, body: Body) -> Result<WriteResponse, Error> {
        self.write(Method::POST, uri, query, body, &[StatusCode::OK, StatusCode::CREATED])
            .await
    }

    /// PUT. The body is parsed for 200.
    pub async fn put(&mut self, uri: &str, query: &Query, body: Body) -> Result<WriteResponse, Error> {
        self.write(Method::PUT, uri, query, body, &[StatusCode::OK])
            .await
    }

    /// PATCH with a JSON merge-patch document. The body is parsed for 200.
    pub async fn patch(&mut self, uri: &str, query: &Query, body: Body) -> Result<WriteResponse, Error> {
        self.write(Method::PATCH, uri, query, body, &[StatusCode::OK])
            .await
    }

    /// DELETE `uri/id`. The body is never parsed.
    pub async fn delete(&mut self, uri: &str, id: &str) -> Result<WriteResponse, Error> {
        let uri = join_id(uri.trim_matches('/'), id)?;
        self.write(Method::DELETE, &uri, &Query::new(), Body::Empty, &[])
            .await
    }

    async fn read(&mut self, uri: &str, url: &str, query: &Query) -> Result<Value, Error> {
        let url = with_query(url, query);
        debug!("GET {url}");

        let mut request = self
            .http
            .client()
            .get(&url)
            .header(ACCEPT, self.config.accept());
        if let Some(bearer) = self.bearer_for(uri) {
            request = request.bearer_auth(bearer);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.evict().await?;
            return Err(Error::external(ExternalErrorKind::Unauthorized));
        }
        if !status.is_success() {
            warn!("GET {url} failed with status {status}");
            return Err(Error::external(ExternalErrorKind::Status(status.as_u16())));
        }

        Ok(response.json::<Value>().await?)
    }

    async fn write(
        &mut self,
        method: Method,
        uri: &str,
        query: &Query,
        body: Body,
        parse_body_on: &[StatusCode],
    ) -> Result<WriteResponse, Error> {
        let url = with_query(&self.url_for(uri)?, query);
        debug!("{method} {url}");

        let bearer = self.bearer_for(uri);

        let response = match body {
            Body::Multipart { fields, files } => {
                let mut request = self
                    .http
                    .plain()
                    .request(method, &url)
                    .header(ACCEPT, self.config.accept())
                    .multipart(multipart_form(fields, files)?);
                if let Some(bearer) = &bearer {
                    request = request.bearer_auth(bearer);
                }
                request.send().await?
            }
            body => {
                let content_type = if method == Method::PATCH {
                    MERGE_PATCH_JSON
                } else {
                    self.config.content_type()
                };

                let mut request = self
                    .http
                    .client()
                    .request(method, &url)
                    .header(ACCEPT, self.config.accept());
                if let Some(bearer) = &bearer {
                    request = request.bearer_auth(bearer);
                }
                request = match body {
                    Body::Json(value) => request.header(CONTENT_TYPE, content_type).json(&value),
                    Body::Form(pairs) => request.form(&pairs),
                    _ => request,
                };
                request.send().await?
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.evict().await?;
        } else if !status.is_success() {
            warn!("{url} answered with status {status}");
        }

        let body = if parse_body_on.contains(&status) {
            match response.json::<Value>().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!("{url} answered {status} with an unreadable body: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(WriteResponse {
            code: status.as_u16(),
            body,
        })
    }

    // The credential exchange itself never carries the bearer
    fn bearer_for(&self, uri: &str) -> Option<String> {
        self.token
            .as_ref()
            .filter(|_| !self.config.is_auth_uri(uri))
            .map(|token| token.expose_secret().clone())
    }

    async fn evict(&mut self) -> Result<(), Error> {
        self.token = None;
        if let Some(login) = &self.login {
            info!("{}: 401 received, evicting token for {}", self.config.name(), login);
            self.tokens.evict(login, self.config.api_url()).await?;
        }
        Ok(())
    }

    fn url_for(&self, uri: &str) -> Result<String, Error> {
        if uri.is_empty() {
            return Err(Error::invalid_request("empty URI"));
        }
        if uri.starts_with("http") {
            return Ok(uri.to_string());
        }
        Ok(format!(
            "{}{}",
            self.config.api_url(),
            uri.trim_start_matches('/')
        ))
    }

    // Absolute URLs (e.g. `hydra:next` links) already carry their format
    fn with_format(&self, uri: &str) -> Result<String, Error> {
        let url = self.url_for(uri)?;
        if self.config.concat_format() && !uri.starts_with("http") {
            Ok(format!("{url}.{}", self.config.format()))
        } else {
            Ok(url)
        }
    }
}

fn join_id(uri: &str, id: &str) -> Result<String, Error> {
    if uri.is_empty() || id.is_empty() {
        return Err(Error::invalid_request("URI and id are required"));
    }
    Ok(format!("{}/{}", uri.trim_end_matches('/'), id))
}

// Absolute links such as `hydra:next` may already carry a query string
fn with_query(url: &str, query: &Query) -> String {
    let query_string = query.to_query_string();
    if query_string.is_empty() {
        return url.to_string();
    }
    let url = url.trim_end_matches(&['?', '&'][..]);
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query_string}")
}

fn multipart_form(
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
) -> Result<reqwest::multipart::Form, Error> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for file in files {
        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime)?;
        }
        form = form.part(file.field, part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OAuth2Settings, JSON_LD};
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::query::Sort;
    use mockito::Matcher;
    use platform_auth::token::{MemoryTokenStore, StoredToken};
    use serde_json::json;

    const LOGIN: &str = "me@example.com";

    fn jwt_config(server: &mockito::Server) -> ProviderConfig {
        ProviderConfig::new("test", &format!("{}/api", server.url()))
            .with_jwt_auth(Credentials::new(LOGIN, "secret"))
    }

    fn api_url(server: &mockito::Server) -> String {
        format!("{}/api/", server.url())
    }

    async fn mock_login(server: &mut mockito::Server, token: &str, hits: usize) -> mockito::Mock {
        server
            .mock("POST", "/api/auth")
            .match_body(Matcher::Json(json!({ "email": LOGIN, "password": "secret" })))
            .with_status(200)
            .with_body(json!({ "token": token }).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    async fn connect(config: ProviderConfig, store: Arc<MemoryTokenStore>) -> ApiClient {
        ApiClient::connect(config, store, HttpClient::new().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn no_auth_call_when_authentication_is_disabled() {
        let mut server = mockito::Server::new_async().await;
        let auth = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let config = ProviderConfig::new("ems_stock", &format!("{}/", server.url()));
        let client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        assert!(client.is_authenticated());
        assert!(client.token().is_none());
        auth.assert_async().await;
    }

    #[tokio::test]
    async fn connect_authenticates_and_caches_the_token() {
        let mut server = mockito::Server::new_async().await;
        let login = mock_login(&mut server, "jwt-1", 1).await;
        let store = Arc::new(MemoryTokenStore::new());

        let client = connect(jwt_config(&server), store.clone()).await;

        login.assert_async().await;
        assert!(client.is_authenticated());
        assert_eq!(client.token().unwrap().expose_secret(), "jwt-1");
        let cached = store.find(LOGIN, &api_url(&server)).await.unwrap().unwrap();
        assert_eq!(cached.token.expose_secret(), "jwt-1");
    }

    #[tokio::test]
    async fn cached_token_is_reused_and_touched() {
        let mut server = mockito::Server::new_async().await;
        let login = mock_login(&mut server, "jwt-new", 0).await;
        let store = Arc::new(MemoryTokenStore::new());

        let mut cached = StoredToken::new(
            LOGIN,
            api_url(&server),
            SecretString::new("jwt-cached".to_string()),
        );
        cached.created_at = chrono::Utc::now() - chrono::Duration::minutes(10);
        cached.updated_at = cached.created_at;
        let created_at = cached.created_at;
        store.save(cached).await.unwrap();

        let client = connect(jwt_config(&server), store.clone()).await;

        login.assert_async().await;
        assert_eq!(client.token().unwrap().expose_secret(), "jwt-cached");
        let stored = store.find(LOGIN, &api_url(&server)).await.unwrap().unwrap();
        assert!(stored.updated_at > created_at);
    }

    #[tokio::test]
    async fn expired_tokens_are_swept_on_connect() {
        let mut server = mockito::Server::new_async().await;
        let login = mock_login(&mut server, "jwt-new", 1).await;
        let store = Arc::new(MemoryTokenStore::new());

        let mut expired = StoredToken::new(
            LOGIN,
            api_url(&server),
            SecretString::new("jwt-expired".to_string()),
        );
        expired.created_at = chrono::Utc::now() - chrono::Duration::minutes(1441);
        store.save(expired).await.unwrap();

        let client = connect(jwt_config(&server), store.clone()).await;

        login.assert_async().await;
        assert_eq!(client.token().unwrap().expose_secret(), "jwt-new");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn rejected_credentials_leave_the_client_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/auth")
            .with_status(401)
            .with_body(r#"{"code":401,"message":"Invalid credentials."}"#)
            .create_async()
            .await;
        let store = Arc::new(MemoryTokenStore::new());

        let client = connect(jwt_config(&server), store.clone()).await;

        assert!(!client.is_authenticated());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn oauth2_flow_posts_a_form_to_the_overridden_url() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/acme/identity/connect/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "password".into()),
                Matcher::UrlEncoded("client_id".into(), "client".into()),
                Matcher::UrlEncoded("username".into(), "API".into()),
                Matcher::UrlEncoded("scope".into(), "api".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"oauth-1"}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("cegid", &format!("{}/acme/entity/Default/22.200.001", server.url()))
            .with_format("json", false)
            .with_oauth2_auth(
                Credentials::new("API", "secret"),
                OAuth2Settings::new("client", "shh").with_scope("api"),
            )
            .with_overridden_auth_url(&format!("{}/acme/identity/connect/token", server.url()));

        let client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        token.assert_async().await;
        assert_eq!(client.token().unwrap().expose_secret(), "oauth-1");
    }

    #[tokio::test]
    async fn get_sends_bearer_format_and_query() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "jwt-1", 1).await;
        let list = server
            .mock("GET", "/api/eco_orders.jsonld")
            .match_header("authorization", "Bearer jwt-1")
            .match_header("accept", JSON_LD)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("order[addDt]".into(), "desc".into()),
                Matcher::UrlEncoded("tags[]".into(), "a".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "hydra:member": [{ "id": 1 }, { "id": 2 }],
                    "hydra:totalItems": 134,
                    "hydra:view": { "hydra:last": "/api/eco_orders.jsonld?page=7" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut client = connect(jwt_config(&server), Arc::new(MemoryTokenStore::new())).await;
        let query = Query::new()
            .with_page(2)
            .with_order("addDt", Sort::Desc)
            .with("tags[]", "a");

        let collection = client.get("eco_orders", &query).await.unwrap();

        list.assert_async().await;
        assert_eq!(collection.members, json!([{ "id": 1 }, { "id": 2 }]));
        assert_eq!(collection.pagination.max_page, 7);
        assert_eq!(collection.pagination.total_items, 134);
    }

    #[tokio::test]
    async fn get_single_appends_the_id() {
        let mut server = mockito::Server::new_async().await;
        let single = server
            .mock("GET", "/companies/56")
            .with_status(200)
            .with_body(r#"{"@id":"/api/companies/56","name":"Acme"}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let company = client.get_single("companies", "56", &Query::new()).await.unwrap();

        single.assert_async().await;
        assert_eq!(company["name"], "Acme");
    }

    #[tokio::test]
    async fn unauthorized_read_evicts_the_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "jwt-1", 1).await;
        let _mock = server
            .mock("GET", "/api/products.jsonld")
            .with_status(401)
            .create_async()
            .await;
        let store = Arc::new(MemoryTokenStore::new());

        let mut client = connect(jwt_config(&server), store.clone()).await;
        assert_eq!(store.len().await, 1);

        let err = client.get("products", &Query::new()).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Unauthorized)
        );
        assert!(store.is_empty().await);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_write_evicts_and_returns_the_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "jwt-1", 1).await;
        let _mock = server
            .mock("POST", "/api/orders")
            .with_status(401)
            .with_body(r#"{"message":"Expired JWT Token"}"#)
            .create_async()
            .await;
        let store = Arc::new(MemoryTokenStore::new());

        let mut client = connect(jwt_config(&server), store.clone()).await;
        let response = client
            .post("orders", &Query::new(), Body::Json(json!({ "orderNumber": "A1" })))
            .await
            .unwrap();

        assert_eq!(response, WriteResponse { code: 401, body: None });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn non_success_read_is_a_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.jsonld")
            .with_status(404)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let err = client.get("missing", &Query::new()).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Status(404))
        );
    }

    #[tokio::test]
    async fn empty_uri_is_rejected_without_a_request() {
        let mut server = mockito::Server::new_async().await;
        let get = server.mock("GET", Matcher::Any).expect(0).create_async().await;
        let post = server.mock("POST", Matcher::Any).expect(0).create_async().await;
        let delete = server.mock("DELETE", Matcher::Any).expect(0).create_async().await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let err = client.get("", &Query::new()).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::InvalidRequest)
        );
        assert!(client.post("", &Query::new(), Body::Empty).await.is_err());
        assert!(client.delete("orders", "").await.is_err());
        get.assert_async().await;
        post.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn post_parses_created_bodies() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/orders")
            .match_header("content-type", JSON_LD)
            .match_body(Matcher::Json(json!({ "orderNumber": "A1" })))
            .with_status(201)
            .with_body(r#"{"@id":"/api/orders/9","id":9}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let response = client
            .post("orders", &Query::new(), Body::Json(json!({ "orderNumber": "A1" })))
            .await
            .unwrap();

        create.assert_async().await;
        assert_eq!(response.code, 201);
        assert_eq!(response.body.unwrap()["id"], 9);
    }

    #[tokio::test]
    async fn put_only_parses_ok_bodies() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/orders/9")
            .with_status(202)
            .with_body(r#"{"queued":true}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let response = client
            .put("orders/9", &Query::new(), Body::Json(json!({ "mailSent": false })))
            .await
            .unwrap();

        assert_eq!(response, WriteResponse { code: 202, body: None });
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn patch_uses_merge_patch() {
        let mut server = mockito::Server::new_async().await;
        let patch = server
            .mock("PATCH", "/orders/9")
            .match_header("content-type", MERGE_PATCH_JSON)
            .with_status(200)
            .with_body(r#"{"id":9,"mailSent":false}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let response = client
            .patch("orders/9", &Query::new(), Body::Json(json!({ "mailSent": false })))
            .await
            .unwrap();

        patch.assert_async().await;
        assert_eq!(response.body.unwrap()["mailSent"], false);
    }

    #[tokio::test]
    async fn delete_never_parses_the_body() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/orders/9")
            .with_status(200)
            .with_body(r#"{"deleted":true}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let response = client.delete("/orders/", "9").await.unwrap();

        delete.assert_async().await;
        assert_eq!(response, WriteResponse { code: 200, body: None });
    }

    #[tokio::test]
    async fn form_and_multipart_bodies_set_their_content_type() {
        let mut server = mockito::Server::new_async().await;
        let form = server
            .mock("POST", "/search")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::UrlEncoded("q".into(), "shoes".into()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/media_objects")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex("name=\"file\"; filename=\"logo.png\"".to_string()))
            .with_status(201)
            .with_body(r#"{"contentUrl":"/media/logo.png"}"#)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        client
            .post(
                "search",
                &Query::new(),
                Body::Form(vec![("q".to_string(), "shoes".to_string())]),
            )
            .await
            .unwrap();
        let response = client
            .post(
                "media_objects",
                &Query::new(),
                Body::Multipart {
                    fields: vec![("alt".to_string(), "Logo".to_string())],
                    files: vec![FilePart {
                        field: "file".to_string(),
                        file_name: "logo.png".to_string(),
                        mime: Some("image/png".to_string()),
                        bytes: b"PNG".to_vec(),
                    }],
                },
            )
            .await
            .unwrap();

        form.assert_async().await;
        upload.assert_async().await;
        assert_eq!(response.body.unwrap()["contentUrl"], "/media/logo.png");
    }

    #[tokio::test]
    async fn absolute_uris_are_used_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let next = server
            .mock("GET", "/elsewhere/orders.jsonld")
            .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let config = ProviderConfig::new("p", "https://unused.invalid/");
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let collection = client
            .get(&format!("{}/elsewhere/orders.jsonld?page=3", server.url()), &Query::new())
            .await
            .unwrap();

        next.assert_async().await;
        assert_eq!(collection.members, json!([]));
        assert_eq!(collection.pagination, Pagination::default());
    }

    #[tokio::test]
    async fn authenticate_with_switches_login() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "jwt-1", 1).await;
        let other = server
            .mock("POST", "/api/auth")
            .match_body(Matcher::Json(json!({ "email": "other@example.com", "password": "pw" })))
            .with_status(200)
            .with_body(r#"{"token":"jwt-other"}"#)
            .create_async()
            .await;
        let store = Arc::new(MemoryTokenStore::new());

        let mut client = connect(jwt_config(&server), store.clone()).await;
        let ok = client
            .authenticate_with(Credentials::new("other@example.com", "pw"))
            .await
            .unwrap();

        other.assert_async().await;
        assert!(ok);
        assert_eq!(client.token().unwrap().expose_secret(), "jwt-other");
        assert_eq!(store.len().await, 2);
    }

    async fn connect_with_token(
        server: &mut mockito::Server,
    ) -> (ApiClient, Arc<MemoryTokenStore>, mockito::Mock) {
        let login = mock_login(server, "jwt-1", 1).await;
        let store = Arc::new(MemoryTokenStore::new());
        let client = connect(jwt_config(server), store.clone()).await;
        assert_eq!(store.len().await, 1);
        (client, store, login)
    }

    async fn mock_unauthorized(server: &mut mockito::Server, method: &str, path: &str) -> mockito::Mock {
        server
            .mock(method, path)
            .match_header("authorization", "Bearer jwt-1")
            .with_status(401)
            .with_body(r#"{"message":"Expired JWT Token"}"#)
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn unauthorized_get_single_evicts_the_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let (mut client, store, _login) = connect_with_token(&mut server).await;
        let single = mock_unauthorized(&mut server, "GET", "/api/orders/9").await;

        let err = client
            .get_single("orders", "9", &Query::new())
            .await
            .unwrap_err();

        single.assert_async().await;
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Unauthorized)
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unauthorized_put_evicts_the_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let (mut client, store, _login) = connect_with_token(&mut server).await;
        let put = mock_unauthorized(&mut server, "PUT", "/api/orders/9").await;

        let response = client
            .put("orders/9", &Query::new(), Body::Json(json!({ "mailSent": true })))
            .await
            .unwrap();

        put.assert_async().await;
        assert_eq!(response, WriteResponse { code: 401, body: None });
        assert!(store.is_empty().await);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_patch_evicts_the_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let (mut client, store, _login) = connect_with_token(&mut server).await;
        let patch = mock_unauthorized(&mut server, "PATCH", "/api/orders/9").await;

        let response = client
            .patch("orders/9", &Query::new(), Body::Json(json!({ "mailSent": true })))
            .await
            .unwrap();

        patch.assert_async().await;
        assert_eq!(response.code, 401);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unauthorized_delete_evicts_the_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let (mut client, store, _login) = connect_with_token(&mut server).await;
        let delete = mock_unauthorized(&mut server, "DELETE", "/api/orders/9").await;

        let response = client.delete("orders", "9").await.unwrap();

        delete.assert_async().await;
        assert_eq!(response, WriteResponse { code: 401, body: None });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unauthorized_upload_evicts_the_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let (mut client, store, _login) = connect_with_token(&mut server).await;
        let upload = mock_unauthorized(&mut server, "POST", "/api/media_objects").await;

        let response = client
            .post(
                "media_objects",
                &Query::new(),
                Body::Multipart {
                    fields: vec![],
                    files: vec![FilePart {
                        field: "file".to_string(),
                        file_name: "logo.png".to_string(),
                        mime: None,
                        bytes: b"PNG".to_vec(),
                    }],
                },
            )
            .await
            .unwrap();

        upload.assert_async().await;
        assert_eq!(response.code, 401);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn reads_of_the_auth_uri_carry_no_bearer() {
        let mut server = mockito::Server::new_async().await;
        let (mut client, _store, _login) = connect_with_token(&mut server).await;
        let auth = server
            .mock("GET", "/api/auth.jsonld")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        client.get("auth", &Query::new()).await.unwrap();

        auth.assert_async().await;
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn absolute_uris_keep_their_query_string() {
        let mut server = mockito::Server::new_async().await;
        let next = server
            .mock("GET", "/elsewhere/orders.jsonld")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "3".into()),
                Matcher::UrlEncoded("site_id".into(), "9".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let config = ProviderConfig::new("p", "https://unused.invalid/");
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        client
            .get(
                &format!("{}/elsewhere/orders.jsonld?page=3", server.url()),
                &Query::new().with("site_id", 9),
            )
            .await
            .unwrap();

        next.assert_async().await;
        assert_eq!(
            with_query("https://x.test/a?page=3", &Query::new().with("q", "b")),
            "https://x.test/a?page=3&q=b"
        );
        assert_eq!(
            with_query("https://x.test/a?", &Query::new().with("q", "b")),
            "https://x.test/a?q=b"
        );
    }

    #[tokio::test]
    async fn unreadable_write_body_is_dropped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/orders")
            .with_status(201)
            .with_body("<html>created</html>")
            .create_async()
            .await;

        let config = ProviderConfig::new("p", &server.url());
        let mut client = connect(config, Arc::new(MemoryTokenStore::new())).await;

        let response = client
            .post("orders", &Query::new(), Body::Json(json!({ "orderNumber": "A1" })))
            .await
            .unwrap();

        assert_eq!(response, WriteResponse { code: 201, body: None });
    }
}
