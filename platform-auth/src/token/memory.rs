//! In-memory token store.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use super::{StoredToken, TokenStore};
use crate::error::Error;

/// In-memory token store for tests and standalone use. Tokens are lost on drop.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Vec<StoredToken>>,
}

impl MemoryTokenStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens currently held.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find(&self, user: &str, domain: &str) -> Result<Option<StoredToken>, Error> {
        Ok(self
            .tokens
            .read()
            .await
            .iter()
            .find(|t| t.matches(user, domain))
            .cloned())
    }

    async fn save(&self, token: StoredToken) -> Result<(), Error> {
        self.tokens.write().await.push(token);
        Ok(())
    }

    async fn touch(&self, user: &str, domain: &str) -> Result<(), Error> {
        let now = Utc::now();
        self.tokens
            .write()
            .await
            .iter_mut()
            .filter(|t| t.matches(user, domain))
            .for_each(|t| t.updated_at = now);
        Ok(())
    }

    async fn delete(&self, user: &str, domain: &str) -> Result<u64, Error> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !t.matches(user, domain));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_older_than(&self, age: Duration) -> Result<u64, Error> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !t.is_older_than(age, now));
        Ok((before - tokens.len()) as u64)
    }
}
