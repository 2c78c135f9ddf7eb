//! # platform-auth
//!
//! Provider-agnostic authentication plumbing for the API Platform SDK:
//! - Token persistence contract (`TokenStore`) with an in-memory implementation
//! - Credential exchange strategies (JWT password login, OAuth2 password grant)
//! - Token lifecycle management (reuse, touch, eviction, age-based sweep)
//! - HTTP client building with optional retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use platform_auth::{
//!     http::HttpClientBuilder,
//!     strategy::{Credentials, JwtPasswordAuth},
//!     token::{MemoryTokenStore, TokenManager},
//! };
//! ```

pub mod error;
pub mod http;
pub mod strategy;
pub mod token;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
