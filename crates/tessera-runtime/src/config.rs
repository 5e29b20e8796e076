use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use tessera_engine::EngineConfig;

use crate::error::{RuntimeError, RuntimeResult};
use crate::logging::parse_level;

/// Process configuration, read from TOML. Every section and key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub logging: LoggingConfig,
    pub storage: EngineConfig,
    pub http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "tessera".into(),
            logging: LoggingConfig::default(),
            storage: EngineConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> RuntimeResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> RuntimeResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        if self.name.trim().is_empty() {
            return Err(RuntimeError::Config("name must not be empty".into()));
        }
        parse_level(&self.logging.level)?;
        self.storage.validate()?;
        if self.http.enabled {
            self.http.socket_addr()?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

/// Admin HTTP listener settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    /// `host:port`. An empty host (`":8080"`) listens on all interfaces.
    pub address: String,
    /// Value of `Access-Control-Allow-Origin`; empty disables CORS headers.
    pub cors_allow_origin: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:8080".into(),
            cors_allow_origin: String::new(),
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> RuntimeResult<SocketAddr> {
        let address = self.address.trim();
        if let Some(port) = address.strip_prefix(':') {
            let port: u16 = port
                .parse()
                .map_err(|_| RuntimeError::Config(format!("invalid listen port: {address:?}")))?;
            return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
        }
        address
            .parse()
            .map_err(|_| RuntimeError::Config(format!("invalid listen address: {address:?}")))
    }
}
