use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<DieselError> for StorageError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(_, info) => {
                StorageError::DatabaseError(info.message().to_string())
            }

            DieselError::SerializationError(e) => {
                StorageError::SerializationError(format!("Serialization error: {e}"))
            }

            DieselError::DeserializationError(e) => {
                StorageError::SerializationError(format!("Deserialization error: {e}"))
            }

            DieselError::RollbackTransaction => {
                StorageError::DatabaseError("Transaction rollback".to_string())
            }

            DieselError::BrokenTransactionManager => {
                StorageError::DatabaseError("Broken transaction manager".to_string())
            }

            _ => StorageError::Unexpected(format!("Unexpected diesel error: {err}")),
        }
    }
}

impl From<R2D2Error> for StorageError {
    fn from(err: R2D2Error) -> Self {
        StorageError::ConnectionError(format!("Connection error: {err}"))
    }
}

impl From<PoolError> for StorageError {
    fn from(err: PoolError) -> Self {
        StorageError::ConnectionError(format!("Connection error: {err}"))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}
