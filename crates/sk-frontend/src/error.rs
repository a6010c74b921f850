use sk_cad::CadError;
use sk_core::CoreError;
use sk_renderer::SyncError;
use thiserror::Error;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Errors raised while handling viewport input
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Kernel(#[from] CadError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type EditorResult<T> = Result<T, EditorError>;
