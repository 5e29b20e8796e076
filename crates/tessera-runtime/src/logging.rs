use std::fmt;
use std::sync::{Arc, RwLock};

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt as tracing_fmt, reload, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{RuntimeError, RuntimeResult};

/// Normalize a level name. Accepts `trace`, `debug`, `info`, `warn` or
/// `warning`, `error`, and `off` or `none`, in any case.
pub fn parse_level(level: &str) -> RuntimeResult<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" | "none" => Ok("off"),
        other => Err(RuntimeError::Config(format!("unknown log level: {other:?}"))),
    }
}

/// Reads and changes the active log level at runtime.
///
/// Obtained from [`init_logging`]; a [`detached`](Self::detached) handle
/// tracks the level without a subscriber behind it.
#[derive(Clone)]
pub struct LogLevelHandle {
    reload: Option<reload::Handle<EnvFilter, Registry>>,
    current: Arc<RwLock<&'static str>>,
}

impl LogLevelHandle {
    pub fn detached(level: &str) -> RuntimeResult<Self> {
        Ok(Self {
            reload: None,
            current: Arc::new(RwLock::new(parse_level(level)?)),
        })
    }

    pub fn level(&self) -> &'static str {
        self.current.read().map(|l| *l).unwrap_or("info")
    }

    /// Switch the global filter to `level`. Unknown names are rejected and
    /// leave the current level in place.
    pub fn set_level(&self, level: &str) -> RuntimeResult<&'static str> {
        let level = parse_level(level)?;
        if let Some(reload) = &self.reload {
            reload
                .reload(EnvFilter::new(level))
                .map_err(|e| RuntimeError::Logging(e.to_string()))?;
        }
        let mut current = self
            .current
            .write()
            .map_err(|e| RuntimeError::Logging(e.to_string()))?;
        *current = level;
        tracing::info!(level, "log level changed");
        Ok(level)
    }
}

impl fmt::Debug for LogLevelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLevelHandle")
            .field("level", &self.level())
            .field("attached", &self.reload.is_some())
            .finish()
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> RuntimeResult<LogLevelHandle> {
    let level = parse_level(&config.level)?;
    let (filter, reload) = reload::Layer::new(EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Text => registry.with(tracing_fmt::layer()).try_init(),
        LogFormat::Json => registry.with(tracing_fmt::layer().json()).try_init(),
    };
    installed.map_err(|e| RuntimeError::Logging(e.to_string()))?;

    Ok(LogLevelHandle {
        reload: Some(reload),
        current: Arc::new(RwLock::new(level)),
    })
}
