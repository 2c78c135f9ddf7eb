//! Database-backed token store.
//!
//! Implements `platform_auth::token::TokenStore` using the `api_tokens` table.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use secrecy::{ExposeSecret, SecretString};

use entity_api::api_token;
use platform_auth::{
    error::{storage_error, Error},
    token::{StoredToken, TokenStore},
};

use crate::{api_tokens::Model, Id};

/// Token store persisting bearer tokens with sea-orm.
#[derive(Clone)]
pub struct DbTokenStore {
    db: DatabaseConnection,
}

impl DbTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn from_model(model: Model) -> StoredToken {
    StoredToken {
        user: model.user,
        domain: model.domain,
        token: SecretString::new(model.token),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl TokenStore for DbTokenStore {
    async fn find(&self, user: &str, domain: &str) -> Result<Option<StoredToken>, Error> {
        let model = api_token::find_by_user_and_domain(&self.db, user, domain)
            .await
            .map_err(storage_error)?;

        Ok(model.map(from_model))
    }

    async fn save(&self, token: StoredToken) -> Result<(), Error> {
        let model = Model {
            id: Id::new_v4(),
            user: token.user,
            domain: token.domain,
            token: token.token.expose_secret().to_string(),
            created_at: token.created_at.into(),
            updated_at: token.updated_at.into(),
        };

        api_token::create(&self.db, model)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn touch(&self, user: &str, domain: &str) -> Result<(), Error> {
        api_token::touch(&self.db, user, domain)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn delete(&self, user: &str, domain: &str) -> Result<u64, Error> {
        api_token::delete_by_user_and_domain(&self.db, user, domain)
            .await
            .map_err(storage_error)
    }

    async fn delete_older_than(&self, age: Duration) -> Result<u64, Error> {
        api_token::delete_older_than(&self.db, age)
            .await
            .map_err(storage_error)
    }
}
