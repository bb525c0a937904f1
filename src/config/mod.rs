// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::app::{self, Opt};
use crate::signal::SignalKind;

#[cfg(test)]
pub mod test_config;

pub const PROD: &str = "prod";
pub const DEV: &str = "dev";
pub const DEBUG: &str = "debug";
pub const TEST: &str = "test";

const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Lifecycle {
    #[serde(rename = "app")]
    pub app: AppBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppBox {
    pub env: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub logs: Option<Logs>,
    pub shutdown: Option<Shutdown>,
    pub heartbeat: Option<Heartbeat>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Shutdown {
    #[serde(rename = "close_signals")]
    pub close_signals: Option<Vec<SignalKind>>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Heartbeat {
    pub enabled: bool,
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

impl Heartbeat {
    pub fn interval(&self) -> Duration {
        self.interval.unwrap_or(DEFAULT_HEARTBEAT_INTERVAL)
    }
}

pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    fn is_debug(&self) -> bool;
    fn is_dev(&self) -> bool;
    fn is_test(&self) -> bool;
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn shutdown(&self) -> Option<&Shutdown>;
    fn heartbeat(&self) -> Option<&Heartbeat>;
}

// Config type alias for convenience
pub type Config = Lifecycle;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.app.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.app.env == PROD
    }

    fn is_debug(&self) -> bool {
        self.app.env == DEBUG
    }

    fn is_dev(&self) -> bool {
        self.app.env == DEV
    }

    fn is_test(&self) -> bool {
        self.app.env == TEST
    }

    fn name(&self) -> &str {
        self.app.name.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }

    fn version(&self) -> &str {
        self.app.version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
    }

    fn shutdown(&self) -> Option<&Shutdown> {
        self.app.shutdown.as_ref()
    }

    fn heartbeat(&self) -> Option<&Heartbeat> {
        self.app.heartbeat.as_ref()
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::parse(&data).with_context(|| format!("unmarshal yaml from {:?}", abs_path))
    }

    /// Parses and validates configuration from YAML text.
    pub fn parse(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data)?;

        match cfg.app.env.as_str() {
            PROD | DEV | DEBUG | TEST => {}
            other => anyhow::bail!("unknown env {:?} (expected prod, dev, debug or test)", other),
        }

        if let Some(heartbeat) = cfg.heartbeat() {
            if heartbeat.enabled && heartbeat.interval().is_zero() {
                anyhow::bail!("heartbeat.interval must be greater than zero");
            }
        }

        Ok(cfg)
    }

    /// Coordinator options described by this configuration.
    /// Servers are not part of the file and must be appended by the caller.
    pub fn options(&self) -> Vec<Opt> {
        let mut opts = vec![app::name(self.name()), app::version(self.version())];

        if let Some(shutdown) = self.shutdown() {
            if let Some(kinds) = &shutdown.close_signals {
                opts.push(app::close_signals(kinds.iter().copied()));
            }
            opts.push(app::shutdown_timeout(shutdown.timeout));
        }

        opts
    }
}
