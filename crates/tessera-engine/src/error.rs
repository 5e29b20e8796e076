use tessera_store::StoreError;

/// Errors raised by the storage engine lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `start` or `configure` called on a running engine.
    #[error("engine already started")]
    AlreadyStarted,

    /// `stop` or `communication_channel` called on an engine that is not running.
    #[error("engine not running")]
    NotRunning,

    /// `start` called before `configure` (or after `stop` without reconfiguring).
    #[error("engine not configured")]
    NotConfigured,

    /// A tunable is out of range.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Pre-creating a namespace failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A worker or dispatcher task ended abnormally.
    #[error("engine task failed: {0}")]
    TaskFailed(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
