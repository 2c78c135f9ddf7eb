//! Cegid XRP Flex (Acumatica) contract-based REST API.
//!
//! Plain JSON, OAuth2 password grant against the tenant identity server, and
//! OData-style `$top` / `$skip` paging with `$select` / `$expand` field lists.

use std::sync::Arc;

use chrono::Duration;
use platform_auth::{http::HttpClient, strategy::Credentials, token::TokenStore};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use service::config::{Config, DEFAULT_CEGID_BASE_URL};

use crate::client::{ApiClient, Collection};
use crate::config::{OAuth2Settings, ProviderConfig, JSON};
use crate::error::Error;
use crate::gateway::{require_id, required};
use crate::query::Query;

pub const NAME: &str = "cegid";
pub const ENDPOINT_PATH: &str = "entity/Default/22.200.001";
pub const TOKEN_PATH: &str = "identity/connect/token";
pub const TOKEN_LIFETIME_MINUTES: i64 = 30;
pub const ITEMS_PER_PAGE: u64 = 20;
pub const SCOPE: &str = "api";

#[derive(Debug, Clone)]
pub struct CegidSettings {
    pub base_url: String,
    pub company_slug: String,
    pub credentials: Credentials,
    pub client_id: String,
    pub client_secret: SecretString,
    pub scope: String,
    pub items_per_page: u64,
}

impl CegidSettings {
    pub fn new(
        company_slug: &str,
        credentials: Credentials,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            base_url: DEFAULT_CEGID_BASE_URL.to_string(),
            company_slug: company_slug.trim_matches('/').to_string(),
            credentials,
            client_id: client_id.to_string(),
            client_secret: SecretString::new(client_secret.to_string()),
            scope: SCOPE.to_string(),
            items_per_page: ITEMS_PER_PAGE,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let credentials = Credentials::new(
            required(config.cegid_login(), "CEGID_LOGIN")?,
            required(config.cegid_password(), "CEGID_PASSWORD")?,
        );

        Ok(Self::new(
            &required(config.cegid_company_slug(), "CEGID_COMPANY_SLUG")?,
            credentials,
            &required(config.cegid_client_id(), "CEGID_CLIENT_ID")?,
            &required(config.cegid_client_secret(), "CEGID_CLIENT_SECRET")?,
        )
        .with_base_url(config.cegid_base_url()))
    }

    /// `{base}/{slug}/entity/Default/22.200.001`
    pub fn api_url(&self) -> String {
        format!("{}/{}", self.tenant_url(), ENDPOINT_PATH)
    }

    /// `{base}/{slug}/identity/connect/token`
    pub fn token_url(&self) -> String {
        format!("{}/{}", self.tenant_url(), TOKEN_PATH)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        let oauth2 = OAuth2Settings::new(
            self.client_id.clone(),
            self.client_secret.expose_secret().clone(),
        )
        .with_scope(&self.scope);

        ProviderConfig::new(NAME, &self.api_url())
            .with_format("json", false)
            .with_media_types(JSON, JSON)
            .with_oauth2_auth(self.credentials.clone(), oauth2)
            .with_auth_uri(&format!("{}/{}", self.company_slug, TOKEN_PATH))
            .with_overridden_auth_url(&self.token_url())
            .with_token_lifetime(Duration::minutes(TOKEN_LIFETIME_MINUTES))
    }

    fn tenant_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.company_slug)
    }
}

pub struct Cegid {
    client: ApiClient,
    items_per_page: u64,
}

impl Cegid {
    pub async fn connect(
        settings: CegidSettings,
        store: Arc<dyn TokenStore>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let items_per_page = settings.items_per_page;
        let client = ApiClient::connect(settings.provider_config(), store, http).await?;

        Ok(Self {
            client,
            items_per_page,
        })
    }

    pub fn client(&mut self) -> &mut ApiClient {
        &mut self.client
    }

    pub async fn get_customers(
        &mut self,
        page: u64,
        select: &[&str],
        expand: &[&str],
    ) -> Result<Collection, Error> {
        let query = self.page_query(page, select, expand);
        self.client.get("Customer", &query).await
    }

    pub async fn get_customer_locations(
        &mut self,
        page: u64,
        select: &[&str],
        expand: &[&str],
    ) -> Result<Collection, Error> {
        let query = self.page_query(page, select, expand);
        self.client.get("CustomerLocation", &query).await
    }

    /// A single location. Acumatica addresses it by its composite key, e.g.
    /// `C000123/MAIN`.
    pub async fn get_customer_location(
        &mut self,
        id: &str,
        select: &[&str],
        expand: &[&str],
    ) -> Result<Value, Error> {
        require_id(id, "customer location")?;
        let query = fields(Query::new(), select, expand);
        self.client
            .get_single("CustomerLocation", id, &query)
            .await
    }

    pub async fn get_contacts(
        &mut self,
        page: u64,
        select: &[&str],
        expand: &[&str],
    ) -> Result<Collection, Error> {
        let query = self.page_query(page, select, expand);
        self.client.get("Contact", &query).await
    }

    fn page_query(&self, page: u64, select: &[&str], expand: &[&str]) -> Query {
        fields(
            Query::new().with_offset_limit(page, self.items_per_page),
            select,
            expand,
        )
    }
}

fn fields(query: Query, select: &[&str], expand: &[&str]) -> Query {
    query.with_list("$select", select).with_list("$expand", expand)
}
