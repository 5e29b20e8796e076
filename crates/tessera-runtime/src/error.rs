use std::path::PathBuf;

use thiserror::Error;

use tessera_engine::EngineError;
use tessera_protocol::RequestError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("module {module}: {message}")]
    Module { module: String, message: String },

    #[error("duplicate module: {0}")]
    DuplicateModule(String),

    #[error("application not configured")]
    NotConfigured,

    #[error("storage engine: {0}")]
    Engine(#[from] EngineError),

    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to encode configuration: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("logging error: {0}")]
    Logging(String),
}

impl RuntimeError {
    /// Wrap a module-specific failure.
    pub fn module(module: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Module {
            module: module.into(),
            message: err.to_string(),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
