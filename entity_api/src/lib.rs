pub use entity::{api_tokens, Id};

pub mod api_token;
pub mod error;
