//! Booking workflows built on top of the API, storage and form layers.
//!
//! Every function returns [`ServiceResult`]; callers display failures through
//! [`ServiceError::user_message`].

use thiserror::Error;

use crate::api::ApiError;
use crate::forms::FormError;
use crate::storage::errors::StorageError;

pub mod appointments;
pub mod availability;
#[cfg(feature = "client")]
pub mod confirmation;
pub mod dashboard;
pub mod draft;
pub mod notifications;
pub mod restore;
pub mod session;
pub mod submission;
pub mod wizard;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("form error: {0}")]
    Form(#[from] FormError),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    /// Blocking validation failure carrying a message meant for the user.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server refused the request; the message is meant for the user.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Message suitable for showing to the person using the client.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Unauthorized => "Acces permis doar administratorilor.".to_string(),
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
                "Va rugam completati corect toate campurile obligatorii.".to_string()
            }
            ServiceError::Validation(message) | ServiceError::Rejected(message) => {
                message.clone()
            }
            ServiceError::Storage(_) => {
                "Datele formularului nu au putut fi salvate local.".to_string()
            }
            ServiceError::Api(err) if err.status() == Some(0) => {
                "Nu s-a putut contacta serverul. Verificati conexiunea la internet.".to_string()
            }
            ServiceError::Api(_) => "Eroare de server. Va rugam incercati mai tarziu.".to_string(),
        }
    }
}
