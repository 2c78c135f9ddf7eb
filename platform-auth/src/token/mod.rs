//! Token persistence and lifecycle management.

mod manager;
mod memory;
mod store;
mod stored;

pub use manager::TokenManager;
pub use memory::MemoryTokenStore;
pub use store::TokenStore;
pub use stored::StoredToken;
