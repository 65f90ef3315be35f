//! Configuration types for regionwatch
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Well-known name whose CNAME target encodes the active region
pub const DEFAULT_RECORD_NAME: &str = "global.health.amazonaws.com";

/// Main regionwatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionwatchConfig {
    /// How the active region is looked up
    #[serde(default)]
    pub resolver: ResolverSourceConfig,

    /// Workflow runner settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl RegionwatchConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.runner.validate()?;
        Ok(())
    }
}

/// Active region lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverSourceConfig {
    /// CNAME lookup of a well-known name
    Dns {
        /// Name whose CNAME target encodes the region
        #[serde(default = "default_record_name")]
        record_name: String,
        /// Explicit nameservers (`ip:port`); system configuration when empty
        #[serde(default)]
        nameservers: Vec<String>,
        /// Per-query timeout in seconds
        #[serde(default = "default_dns_timeout_secs")]
        timeout_secs: u64,
    },

    /// Always report the same region
    Static {
        /// Region code, e.g. "us-east-1"
        region: String,
    },

    /// Custom resolver
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ResolverSourceConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverSourceConfig::Dns {
                record_name,
                timeout_secs,
                ..
            } => {
                if record_name.is_empty() {
                    return Err(crate::Error::config("DNS record name cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("DNS timeout must be > 0"));
                }
                Ok(())
            }
            ResolverSourceConfig::Static { region } => {
                if region.is_empty() {
                    return Err(crate::Error::config("Static region cannot be empty"));
                }
                Ok(())
            }
            ResolverSourceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom resolver factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom resolver config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the resolver type name used for registry lookups
    pub fn type_name(&self) -> &str {
        match self {
            ResolverSourceConfig::Dns { .. } => "dns",
            ResolverSourceConfig::Static { .. } => "static",
            ResolverSourceConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ResolverSourceConfig {
    fn default() -> Self {
        ResolverSourceConfig::Dns {
            record_name: default_record_name(),
            nameservers: Vec::new(),
            timeout_secs: default_dns_timeout_secs(),
        }
    }
}

/// Workflow runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of restarts on region change
    ///
    /// `None` restarts for as long as the region keeps changing. Region
    /// changes are expected to be rare, so a single restart normally
    /// converges.
    #[serde(default)]
    pub max_restarts: Option<usize>,

    /// Pause before restarting after a region change (in milliseconds)
    #[serde(default)]
    pub restart_delay_ms: u64,

    /// Capacity of the runner event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 100 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl RunnerConfig {
    /// Validate the runner configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Runner event channel capacity must be > 0",
            ));
        }
        Ok(())
    }

    /// Cap the number of restarts
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = Some(max_restarts);
        self
    }

    /// Set the pause between restarts
    pub fn with_restart_delay_ms(mut self, restart_delay_ms: u64) -> Self {
        self.restart_delay_ms = restart_delay_ms;
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_restarts: None,
            restart_delay_ms: 0,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_record_name() -> String {
    DEFAULT_RECORD_NAME.to_string()
}

fn default_dns_timeout_secs() -> u64 {
    5
}

fn default_event_channel_capacity() -> usize {
    100
}
