//! Error types for the core data model

use sk_cad::CadError;
use thiserror::Error;
use uuid::Uuid;

/// Core errors
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Component {0} was freed and can no longer be used")]
    InvalidReference(Uuid),

    #[error("Component not found in tree: {0}")]
    ComponentNotFound(Uuid),

    #[error(transparent)]
    Kernel(#[from] CadError),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
