//! Token manager: cache-aware token acquisition on top of a [`TokenStore`].

use std::sync::Arc;

use chrono::Duration;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::{StoredToken, TokenStore};
use crate::error::Error;
use crate::http::HttpClient;
use crate::strategy::{Authenticator, Credentials};

/// Token manager that reuses cached tokens and obtains new ones when none is cached.
///
/// Tokens are keyed by (login, domain), where domain is the API base URL.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    lifetime: Duration,
}

impl TokenManager {
    /// Create a new token manager over `store`. Tokens older than `lifetime` are swept.
    pub fn new(store: Arc<dyn TokenStore>, lifetime: Duration) -> Self {
        Self { store, lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Delete every token, for any user and domain, older than the lifetime.
    pub async fn sweep(&self) -> Result<u64, Error> {
        let removed = self.store.delete_older_than(self.lifetime).await?;
        if removed > 0 {
            info!(
                "Swept {} API tokens older than {} minutes",
                removed,
                self.lifetime.num_minutes()
            );
        }
        Ok(removed)
    }

    /// Return a usable token for `credentials` on `domain`.
    ///
    /// This method:
    /// 1. Looks up a cached token and, on a hit, touches it and returns it
    /// 2. Otherwise runs the credential exchange through `authenticator`
    /// 3. Persists a newly issued token before returning it
    ///
    /// # Returns
    ///
    /// `None` if the provider rejected the credentials.
    pub async fn obtain(
        &self,
        authenticator: &dyn Authenticator,
        http: &HttpClient,
        domain: &str,
        credentials: &Credentials,
    ) -> Result<Option<SecretString>, Error> {
        if let Some(cached) = self.store.find(&credentials.login, domain).await? {
            debug!("Reusing cached token for {} on {}", credentials.login, domain);
            self.store.touch(&credentials.login, domain).await?;
            return Ok(Some(cached.token));
        }

        let Some(token) = authenticator.request_token(http, credentials).await? else {
            warn!(
                "{} authentication rejected for {} on {}",
                authenticator.method(),
                credentials.login,
                domain
            );
            return Ok(None);
        };

        self.store
            .save(StoredToken::new(&credentials.login, domain, token.clone()))
            .await?;
        info!(
            "Obtained {} token for {} on {}",
            authenticator.method(),
            credentials.login,
            domain
        );

        Ok(Some(token))
    }

    /// Drop the cached tokens for a user and domain, e.g. after a 401.
    pub async fn evict(&self, user: &str, domain: &str) -> Result<u64, Error> {
        let removed = self.store.delete(user, domain).await?;
        debug!("Evicted {} cached tokens for {} on {}", removed, user, domain);
        Ok(removed)
    }
}
