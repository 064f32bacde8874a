use error_common::ScribeError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EntitlementError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),
}

impl From<EntitlementError> for ScribeError {
    fn from(err: EntitlementError) -> Self {
        match err {
            EntitlementError::Storage(msg) => ScribeError::StorageError(msg),
            other => ScribeError::NotFound(other.to_string()),
        }
    }
}

pub type EntitlementResult<T> = Result<T, EntitlementError>;
