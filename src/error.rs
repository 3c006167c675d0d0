//! Error types for the storage, service and configuration layers

use thiserror::Error;

/// Errors raised by a [`MappingStore`](crate::store::MappingStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The code is already taken. Transient: the service retries with a new candidate.
    #[error("short code already exists: {0}")]
    CodeCollision(String),
    #[error("storage backend error: {0}")]
    Backend(#[from] redb::Error),
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

macro_rules! redb_into_store_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(value: $ty) -> Self {
                    Self::Backend(redb::Error::from(value))
                }
            }
        )*
    };
}

redb_into_store_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Errors surfaced by the [`ShortLinkService`](crate::service::ShortLinkService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("could not generate a unique short code after {attempts} attempts")]
    GenerationFailure { attempts: u32 },
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
