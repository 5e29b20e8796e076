use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Tunables for the in-memory storage engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of worker tasks.
    pub workers: usize,
    /// Capacity of the inbound queue and of each worker queue.
    pub queue_depth: usize,
    /// Create unknown indexes on write instead of rejecting the write.
    pub auto_index: bool,
    /// Seconds after which an idle database group may expire. Not acted on.
    pub expire_group: u64,
    /// Interval count. Not acted on.
    pub intervals: u64,
    /// Minimum distance. Not acted on.
    pub min_distance: u64,
    /// Seconds a producer waits for the inbound queue to accept a request.
    pub submit_timeout: u64,
    /// Indexes created when the engine starts.
    pub namespaces: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_depth: 1,
            auto_index: true,
            expire_group: 604_800,
            intervals: 10,
            min_distance: 0,
            submit_timeout: 2,
            namespaces: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(EngineError::InvalidConfig(
                "queue_depth must be at least 1".into(),
            ));
        }
        if let Some(blank) = self.namespaces.iter().find(|n| n.is_empty()) {
            return Err(EngineError::InvalidConfig(format!(
                "namespace names must not be empty (got {blank:?})"
            )));
        }
        Ok(())
    }

    pub fn submit_duration(&self) -> Duration {
        Duration::from_secs(self.submit_timeout)
    }

    pub fn expire_duration(&self) -> Duration {
        Duration::from_secs(self.expire_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.workers, 10);
        assert_eq!(config.queue_depth, 1);
        assert!(config.auto_index);
        assert_eq!(config.expire_duration(), Duration::from_secs(604_800));
        assert_eq!(config.intervals, 10);
        assert_eq!(config.min_distance, 0);
        assert_eq!(config.submit_duration(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str("workers = 4\nauto_index = false").unwrap();
        assert_eq!(config.workers, 4);
        assert!(!config.auto_index);
        assert_eq!(config.queue_depth, 1);
        assert_eq!(config.submit_timeout, 2);
    }

    #[test]
    fn zero_workers_rejected() {
        let config = EngineConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_queue_depth_rejected() {
        let config = EngineConfig {
            queue_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_namespace_rejected() {
        let config = EngineConfig {
            namespaces: vec!["ok".into(), String::new()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
