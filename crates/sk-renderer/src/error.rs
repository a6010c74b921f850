//! Error types for scene synchronization

use sk_cad::CadError;
use sk_core::CoreError;
use thiserror::Error;

/// Scene synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Tree access failed (freed or unknown component)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The kernel rejected a call
    #[error(transparent)]
    Kernel(#[from] CadError),
}

/// Result type for scene synchronization
pub type SyncResult<T> = Result<T, SyncError>;
