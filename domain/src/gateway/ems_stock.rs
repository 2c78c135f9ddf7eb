//! EMS Stock catalogue API. Public, no authentication.

use std::sync::Arc;

use platform_auth::{http::HttpClient, token::TokenStore};
use service::config::{Config, DEFAULT_EMS_STOCK_API_URL};

use crate::client::{ApiClient, Collection};
use crate::config::{ProviderConfig, DEFAULT_FORMAT};
use crate::error::Error;
use crate::query::{Query, Sort};

pub const NAME: &str = "ems_stock";

#[derive(Debug, Clone)]
pub struct EmsStockSettings {
    pub api_url: String,
}

impl Default for EmsStockSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_EMS_STOCK_API_URL.to_string(),
        }
    }
}

impl EmsStockSettings {
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::default().with_api_url(config.ems_stock_api_url())
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(NAME, &self.api_url).with_format(DEFAULT_FORMAT, true)
    }
}

pub struct EmsStock {
    client: ApiClient,
}

impl EmsStock {
    pub async fn connect(
        settings: EmsStockSettings,
        store: Arc<dyn TokenStore>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let client = ApiClient::connect(settings.provider_config(), store, http).await?;
        Ok(Self { client })
    }

    pub fn client(&mut self) -> &mut ApiClient {
        &mut self.client
    }

    /// Brands in alphabetical order.
    pub async fn get_brands(&mut self, page: u64) -> Result<Collection, Error> {
        let query = Query::new()
            .with_page(page)
            .with_order("name", Sort::Asc);
        self.client.get("brands", &query).await
    }

    /// Products, most recently created first.
    pub async fn get_products(&mut self, page: u64) -> Result<Collection, Error> {
        let query = Query::new()
            .with_page(page)
            .with_order("createdAt", Sort::Desc);
        self.client.get("products", &query).await
    }
}
