//! Token store trait for persisting bearer tokens.

use async_trait::async_trait;
use chrono::Duration;

use super::StoredToken;
use crate::error::Error;

/// Trait for storing and retrieving cached bearer tokens.
///
/// Implementations need no concurrency control: last writer wins, and several rows
/// for the same (user, domain) are tolerated since lookups accept any match.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Retrieve a token for a user and domain.
    ///
    /// # Returns
    ///
    /// `Some(StoredToken)` if found, `None` if not found.
    async fn find(&self, user: &str, domain: &str) -> Result<Option<StoredToken>, Error>;

    /// Insert a newly issued token.
    async fn save(&self, token: StoredToken) -> Result<(), Error>;

    /// Refresh `updated_at` on the tokens for a user and domain.
    async fn touch(&self, user: &str, domain: &str) -> Result<(), Error>;

    /// Delete the tokens for a user and domain. A missing pair is not an error.
    ///
    /// # Returns
    ///
    /// The number of tokens removed.
    async fn delete(&self, user: &str, domain: &str) -> Result<u64, Error>;

    /// Delete every token, for any user and domain, created more than `age` ago.
    ///
    /// # Returns
    ///
    /// The number of tokens removed.
    async fn delete_older_than(&self, age: Duration) -> Result<u64, Error>;
}
