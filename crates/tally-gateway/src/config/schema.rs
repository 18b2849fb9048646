use std::str::FromStr;

use serde::Deserialize;
use tally_core::error::{Result, TallyError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            store: StoreSection::default(),
        }
    }
}

impl TallyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TallyError::InvalidConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.store.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for every path not matched by an API route.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(TallyError::InvalidConfig("server.port must not be 0".into()));
        }
        if self.host.trim().is_empty() {
            return Err(TallyError::InvalidConfig("server.host must not be empty".into()));
        }
        if self.static_dir.trim().is_empty() {
            return Err(TallyError::InvalidConfig(
                "server.static_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// `host:port` as handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_static_dir() -> String {
    "public".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Redis => "redis",
            StoreBackend::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(TallyError::InvalidConfig(format!("unknown store backend: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_store_url")]
    pub url: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Redis {
            let scheme_ok = ["redis://", "rediss://", "unix://"]
                .iter()
                .any(|p| self.url.starts_with(p));
            if !scheme_ok {
                return Err(TallyError::InvalidConfig(format!(
                    "store.url must be a redis://, rediss:// or unix:// url, got {:?}",
                    self.url
                )));
            }
        }
        Ok(())
    }
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379".into()
}
