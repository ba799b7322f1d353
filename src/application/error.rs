// Error taxonomy shared by the application services
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input rejected before any store access.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A reading referenced a device the registry does not know.
    #[error("device not found: {0}")]
    UnknownDevice(String),

    /// A collaborator outside this service failed; carries its status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn device_not_found(id: &str) -> Self {
        ServiceError::NotFound {
            entity: "device",
            id: id.to_string(),
        }
    }

    pub fn reading_not_found(id: &str) -> Self {
        ServiceError::NotFound {
            entity: "reading",
            id: id.to_string(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
