//! The SDK surface: a generic JSON-LD / Hydra API client driven by a [`ProviderConfig`],
//! its query builder and pagination parsing, the database-backed token store, and the
//! per-provider facades under [`gateway`].

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{api_tokens, Id};

// Auth plumbing consumers need to build a client without depending on `platform-auth`
pub use platform_auth::{
    http::{HttpClient, HttpClientBuilder, HttpClientConfig},
    strategy::{AuthMethod, Credentials},
    token::{MemoryTokenStore, TokenStore},
};

pub mod client;
pub mod config;
pub mod error;
pub mod hydra;
pub mod query;
pub mod token_storage;

pub mod gateway;

pub use client::{ApiClient, Body, Collection, FilePart, WriteResponse};
pub use config::{OAuth2Settings, ProviderConfig};
pub use hydra::Pagination;
pub use query::{Query, Sort};
pub use token_storage::DbTokenStore;
