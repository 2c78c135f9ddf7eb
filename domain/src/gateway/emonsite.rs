//! e-monsite store API: e-commerce orders and blog posts of one site.

use std::sync::Arc;

use platform_auth::{http::HttpClient, strategy::Credentials, token::TokenStore};
use service::config::{Config, DEFAULT_EMONSITE_API_URL};

use crate::client::{ApiClient, Collection};
use crate::config::{ProviderConfig, DEFAULT_FORMAT};
use crate::error::Error;
use crate::gateway::required;
use crate::query::{Query, Sort};

pub const NAME: &str = "emonsite";

#[derive(Debug, Clone)]
pub struct EmonsiteSettings {
    pub api_url: String,
    pub credentials: Credentials,
    /// Sent as `site_id` on every listing.
    pub site_id: String,
}

impl EmonsiteSettings {
    pub fn new(credentials: Credentials, site_id: &str) -> Self {
        Self {
            api_url: DEFAULT_EMONSITE_API_URL.to_string(),
            credentials,
            site_id: site_id.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let credentials = Credentials::new(
            required(config.emonsite_login(), "EMONSITE_LOGIN")?,
            required(config.emonsite_password(), "EMONSITE_PASSWORD")?,
        );
        let site_id = required(config.emonsite_site_id(), "EMONSITE_SITE_ID")?;

        Ok(Self::new(credentials, &site_id).with_api_url(config.emonsite_api_url()))
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(NAME, &self.api_url)
            .with_format(DEFAULT_FORMAT, true)
            .with_jwt_auth(self.credentials.clone())
    }
}

pub struct Emonsite {
    client: ApiClient,
    site_id: String,
}

impl Emonsite {
    pub async fn connect(
        settings: EmonsiteSettings,
        store: Arc<dyn TokenStore>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let client = ApiClient::connect(settings.provider_config(), store, http).await?;
        Ok(Self {
            client,
            site_id: settings.site_id,
        })
    }

    /// The underlying client, for endpoints without a dedicated method.
    pub fn client(&mut self) -> &mut ApiClient {
        &mut self.client
    }

    /// Orders of the site, newest first.
    pub async fn get_eco_orders(&mut self, page: u64) -> Result<Collection, Error> {
        let query = self.listing(page, "addDt");
        self.client.get("eco_orders", &query).await
    }

    /// Blog posts of the site, latest publication first.
    pub async fn get_blog_posts(&mut self, page: u64) -> Result<Collection, Error> {
        let query = self.listing(page, "publishFrom");
        self.client.get("blog_posts", &query).await
    }

    fn listing(&self, page: u64, order_by: &str) -> Query {
        Query::new()
            .with_page(page)
            .with_order(order_by, Sort::Desc)
            .with("site_id", &self.site_id)
    }
}
