//! Concrete API providers built on top of [`crate::ApiClient`].
//!
//! Each provider exposes a settings struct (defaults plus loading from
//! [`service::config::Config`]) and a thin facade with one method per endpoint.

use platform_auth::http::{HttpClient, HttpClientBuilder};
use service::config::Config;
use std::time::Duration;

use crate::error::Error;

pub mod cegid;
pub mod econfiance;
pub mod emonsite;
pub mod ems_stock;

/// HTTP client configured from the process configuration.
pub fn http_client(config: &Config) -> Result<HttpClient, Error> {
    let client = HttpClientBuilder::new()
        .with_timeout(Duration::from_secs(config.http_timeout_secs))
        .with_max_retries(config.http_max_retries)
        .accept_invalid_certs(config.http_accept_invalid_certs)
        .build()?;

    Ok(client)
}

pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(&format!("{name} is not configured")))
}

pub(crate) fn require_id(id: &str, what: &str) -> Result<(), Error> {
    if id.trim().is_empty() {
        return Err(Error::invalid_request(&format!("{what} id is required")));
    }
    Ok(())
}
