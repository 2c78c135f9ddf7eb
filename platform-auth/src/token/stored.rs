//! Cached bearer token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

/// A bearer token cached for one (user, domain) pair.
///
/// `domain` is the API base URL the token was issued for. The token value is a
/// `SecretString` and never shows up in `Debug` output.
#[derive(Debug, Clone)]
pub struct StoredToken {
    /// Credential identifier (login or e-mail) the token was issued to.
    pub user: String,
    /// API base URL the token is valid for.
    pub domain: String,
    /// Opaque bearer credential.
    pub token: SecretString,
    /// When the token was obtained.
    pub created_at: DateTime<Utc>,
    /// When the token was last reused.
    pub updated_at: DateTime<Utc>,
}

impl StoredToken {
    /// A freshly issued token, created and updated now.
    pub fn new(user: impl Into<String>, domain: impl Into<String>, token: SecretString) -> Self {
        let now = Utc::now();
        Self {
            user: user.into(),
            domain: domain.into(),
            token,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the token was created more than `age` before `now`.
    pub fn is_older_than(&self, age: Duration, now: DateTime<Utc>) -> bool {
        self.created_at < now - age
    }

    pub fn matches(&self, user: &str, domain: &str) -> bool {
        self.user == user && self.domain == domain
    }
}
