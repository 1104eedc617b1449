//! Configuration loaded from an optional TOML file; CLI flags override
//! whatever the file provides.

use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GameError, Result};
use crate::protocol::{PORT_MAX, PORT_MIN};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Discovery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// IPv4 broadcast address adverts are sent to (e.g. 255.255.255.255).
    /// No default; must come from the file or the CLI for networked play.
    pub broadcast_addr: Option<Ipv4Addr>,
    /// UDP port adverts are sent to and received on.
    /// Must lie in [9000..9100].
    pub broadcast_port: Option<u16>,
    /// Duration of each discovery/accept window in seconds
    /// Default: 5.0
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            broadcast_addr: None,
            broadcast_port: None,
            window_secs: default_window_secs(),
        }
    }
}

/// Timeout configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// Maximum silence between gameplay messages in seconds; a session that
    /// waits longer than this on its peer is torn down
    /// Default: 300 (5 minutes)
    #[serde(default = "default_session_secs")]
    pub session_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            session_secs: default_session_secs(),
        }
    }
}

impl Config {
    pub fn window(&self) -> Duration {
        Duration::from_secs_f64(self.discovery.window_secs)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.session_secs)
    }
}

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = std::fs::read_to_string(p)
        .map_err(|e| GameError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| GameError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    if let Some(port) = cfg.discovery.broadcast_port {
        if !(PORT_MIN..=PORT_MAX).contains(&port) {
            return Err(GameError::Config(format!(
                "Broadcast port must be in [{PORT_MIN}..{PORT_MAX}], got {port}"
            )));
        }
    }
    if !cfg.discovery.window_secs.is_finite() || cfg.discovery.window_secs <= 0.0 {
        return Err(GameError::Config(format!(
            "Discovery window must be positive, got {}",
            cfg.discovery.window_secs
        )));
    }
    if cfg.timeouts.session_secs == 0 {
        return Err(GameError::Config(
            "Session timeout must be positive".to_string(),
        ));
    }
    Ok(())
}

fn default_window_secs() -> f64 {
    5.0
}

fn default_session_secs() -> u64 {
    300
}
