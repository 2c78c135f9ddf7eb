//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use platform_auth::error::{Error as PlatformAuthError, ErrorKind as PlatformAuthErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries: callers of the SDK depend on `domain` only, never directly on
/// `entity_api` or `platform-auth`.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    /// The call was rejected before any network request was made.
    InvalidRequest,
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    DbTransaction,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The API answered 401; the cached token has been evicted.
    Unauthorized,
    /// Any other non-2xx answer to a read.
    Status(u16),
    /// A 2xx answer whose body could not be parsed.
    InvalidResponse,
    Other(String),
}

impl Error {
    pub(crate) fn invalid_request(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::InvalidRequest),
        }
    }

    pub(crate) fn config(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }

    pub(crate) fn external(kind: ExternalErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
fn entity_error_kind(kind: &EntityApiErrorKind) -> EntityErrorKind {
    match kind {
        EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
        EntityApiErrorKind::InvalidQueryTerm => EntityErrorKind::Invalid,
        EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the request or the reqwest::Client
        // instance. This type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build request".to_string(),
                )),
            }
        // Bodies that arrived but could not be decoded.
        } else if err.is_decode() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::InvalidResponse),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            other => Error {
                source: Some(Box::new(other)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to serialize payload".to_string(),
            )),
        }
    }
}

impl From<PlatformAuthError> for Error {
    fn from(err: PlatformAuthError) -> Self {
        let error_kind = match &err.error_kind {
            PlatformAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            PlatformAuthErrorKind::Auth(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            // Token stores backed by `entity_api` keep its error as the source
            PlatformAuthErrorKind::Token(_) => {
                let entity_kind = err
                    .source
                    .as_ref()
                    .and_then(|source| source.downcast_ref::<EntityApiError>())
                    .map_or(EntityErrorKind::DbTransaction, |e| {
                        entity_error_kind(&e.error_kind)
                    });
                DomainErrorKind::Internal(InternalErrorKind::Entity(entity_kind))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
