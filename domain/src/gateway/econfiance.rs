//! e-confiance review certification API.
//!
//! A company posts its orders, the products of each order and the customer reviews
//! of those products. Resources link to each other with IRIs such as
//! `/api/orders/{id}`, so the write methods take numeric ids and build the IRIs.

use std::sync::Arc;

use chrono::Duration;
use log::*;
use platform_auth::{http::HttpClient, strategy::Credentials, token::TokenStore};
use serde::Serialize;
use serde_json::Value;
use service::config::{
    Config, DEFAULT_ECONFIANCE_API_URL, DEFAULT_ECONFIANCE_COMPANY_ID,
    DEFAULT_TOKEN_LIFETIME_MINUTES,
};

use crate::client::{ApiClient, Body, Collection, WriteResponse};
use crate::config::{ProviderConfig, DEFAULT_FORMAT};
use crate::error::Error;
use crate::gateway::{require_id, required};
use crate::query::Query;

pub const NAME: &str = "econfiance";
pub const AUTH_URI: &str = "login_check";

#[derive(Debug, Clone)]
pub struct EconfianceSettings {
    pub api_url: String,
    /// The login is the company slug.
    pub credentials: Credentials,
    pub company_id: u64,
}

impl EconfianceSettings {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_url: DEFAULT_ECONFIANCE_API_URL.to_string(),
            credentials,
            company_id: DEFAULT_ECONFIANCE_COMPANY_ID,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn with_company_id(mut self, company_id: u64) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let credentials = Credentials::new(
            required(config.econfiance_login(), "ECONFIANCE_LOGIN")?,
            required(config.econfiance_password(), "ECONFIANCE_PASSWORD")?,
        );

        Ok(Self::new(credentials)
            .with_api_url(config.econfiance_api_url())
            .with_company_id(config.econfiance_company_id()))
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(NAME, &self.api_url)
            .with_format(DEFAULT_FORMAT, false)
            .with_jwt_auth(self.credentials.clone())
            .with_auth_uri(AUTH_URI)
            .with_token_lifetime(Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES))
    }
}

/// An order placed by a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_number: String,
    pub customer_email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// When true the platform does not mail the customer itself.
    pub mail_sent: bool,
    pub customer_phone: Option<String>,
}

impl NewOrder {
    pub fn new(order_number: &str, customer_email: &str) -> Self {
        Self {
            order_number: order_number.to_string(),
            customer_email: customer_email.to_string(),
            firstname: None,
            lastname: None,
            mail_sent: true,
            customer_phone: None,
        }
    }
}

/// A product bought in an order created with [`Econfiance::create_order`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProductOrder {
    pub order_id: u64,
    pub name: String,
    pub reference: String,
    pub image_url: String,
    pub link: String,
    pub free_field: String,
    pub follow_up: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewStatus {
    /// Awaiting moderation.
    #[default]
    Pending,
    Published,
}

impl ReviewStatus {
    pub fn iri(&self) -> &'static str {
        match self {
            ReviewStatus::Published => "/api/review_statuses/1",
            ReviewStatus::Pending => "/api/review_statuses/2",
        }
    }
}

/// A customer review of a product of an existing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProductReview {
    pub order_id: u64,
    pub product_name: String,
    pub reference: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub content: String,
    /// 1 to 5.
    pub rating: u8,
    pub status: ReviewStatus,
    pub customer_ip: String,
    pub browser_user_agent: Option<String>,
    pub free_field: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductOrderPayload<'a> {
    order_parent: String,
    name: &'a str,
    reference: &'a str,
    free_field: &'a str,
    image: &'a str,
    follow_up: u8,
    link: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductReviewPayload<'a> {
    order_parent: String,
    product_name: &'a str,
    reference: Option<&'a str>,
    free_field: Option<&'a str>,
    image: Option<&'a str>,
    link: Option<&'a str>,
    content: &'a str,
    rating: u8,
    status: &'static str,
    browser: Vec<&'a str>,
    customer_ip: &'a str,
    company: String,
}

fn order_iri(order_id: u64) -> String {
    format!("/api/orders/{order_id}")
}

fn company_iri(company_id: u64) -> String {
    format!("/api/companies/{company_id}")
}

pub struct Econfiance {
    client: ApiClient,
    login: String,
    company_id: u64,
}

impl Econfiance {
    pub async fn connect(
        settings: EconfianceSettings,
        store: Arc<dyn TokenStore>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let login = settings.credentials.login.clone();
        let company_id = settings.company_id;
        let client = ApiClient::connect(settings.provider_config(), store, http).await?;

        Ok(Self {
            client,
            login,
            company_id,
        })
    }

    pub fn client(&mut self) -> &mut ApiClient {
        &mut self.client
    }

    pub fn company_id(&self) -> u64 {
        self.company_id
    }

    pub async fn get_companies(&mut self, page: u64) -> Result<Collection, Error> {
        let query = Query::new().with_page(page);
        self.client.get("companies", &query).await
    }

    /// A company, the configured one when `id` is `None`.
    pub async fn get_company(&mut self, id: Option<&str>) -> Result<Value, Error> {
        let id = match id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id.to_string(),
            None => self.company_id.to_string(),
        };
        self.client.get_single("companies", &id, &Query::new()).await
    }

    pub async fn get_company_global_rating(&mut self, id: &str) -> Result<Value, Error> {
        require_id(id, "company")?;
        self.client
            .get_single("companies/global-rating", id, &Query::new())
            .await
    }

    pub async fn get_product_order(&mut self, id: &str) -> Result<Value, Error> {
        require_id(id, "product order")?;
        self.client
            .get_single("product_orders", id, &Query::new())
            .await
    }

    pub async fn get_product_reviews(&mut self, page: u64) -> Result<Collection, Error> {
        let query = Query::new().with_page(page);
        self.client.get("product_reviews", &query).await
    }

    pub async fn get_product_review(&mut self, id: &str) -> Result<Value, Error> {
        require_id(id, "product review")?;
        self.client
            .get_single("product_reviews", id, &Query::new())
            .await
    }

    /// Average rating of the product `reference` of this company.
    pub async fn get_product_review_average(&mut self, reference: &str) -> Result<Value, Error> {
        require_id(reference, "product reference")?;
        let id = format!("{}/{}", self.login, reference);
        self.client
            .get_single("product_reviews/average", &id, &Query::new())
            .await
    }

    pub async fn get_order(&mut self, id: &str) -> Result<Value, Error> {
        require_id(id, "order")?;
        self.client.get_single("orders", id, &Query::new()).await
    }

    pub async fn create_order(&mut self, order: &NewOrder) -> Result<WriteResponse, Error> {
        if order.order_number.trim().is_empty() || order.customer_email.trim().is_empty() {
            return Err(Error::invalid_request(
                "an order needs an order number and a customer email",
            ));
        }

        debug!("Creating e-confiance order {}", order.order_number);
        let body = Body::Json(serde_json::to_value(order)?);
        self.client.post("orders", &Query::new(), body).await
    }

    /// Attach a product to an order. The order must already exist.
    pub async fn create_product_order(
        &mut self,
        product: &NewProductOrder,
    ) -> Result<WriteResponse, Error> {
        if product.order_id == 0 {
            return Err(Error::invalid_request("a product order needs an order id"));
        }

        let payload = ProductOrderPayload {
            order_parent: order_iri(product.order_id),
            name: &product.name,
            reference: &product.reference,
            free_field: &product.free_field,
            image: &product.image_url,
            follow_up: u8::from(product.follow_up),
            link: &product.link,
        };
        let body = Body::Json(serde_json::to_value(payload)?);
        self.client.post("product_orders", &Query::new(), body).await
    }

    /// Post a review for a product of an existing order.
    pub async fn create_product_review(
        &mut self,
        review: &NewProductReview,
    ) -> Result<WriteResponse, Error> {
        if review.order_id == 0 {
            return Err(Error::invalid_request("a product review needs an order id"));
        }
        if !(1..=5).contains(&review.rating) {
            return Err(Error::invalid_request("a rating goes from 1 to 5"));
        }

        let payload = ProductReviewPayload {
            order_parent: order_iri(review.order_id),
            product_name: &review.product_name,
            reference: review.reference.as_deref(),
            free_field: review.free_field.as_deref(),
            image: review.image_url.as_deref(),
            link: review.link.as_deref(),
            content: &review.content,
            rating: review.rating,
            status: review.status.iri(),
            browser: review.browser_user_agent.as_deref().into_iter().collect(),
            customer_ip: &review.customer_ip,
            company: company_iri(self.company_id),
        };
        let body = Body::Json(serde_json::to_value(payload)?);
        self.client.post("product_reviews", &Query::new(), body).await
    }
}
