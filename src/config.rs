//! Configuration management for stackd
//!
//! Settings load from environment variables with sensible defaults and can
//! be overridden per-field from the CLI. Defaults mirror the service's
//! original deployment: port 2000, at most 1000 stacks of at most 102 400
//! elements, one-hour idle expiry.
//!
//! # Environment Variables
//!
//! - `STACKD_HOST`: listen address - default: "127.0.0.1"
//! - `STACKD_PORT`: listen port - default: "2000"
//! - `STACKD_MAX_STACKS`: registry instance bound - default: "1000"
//! - `STACKD_MAX_DEPTH`: per-stack depth bound - default: "102400"
//! - `STACKD_MAX_VALUE_LEN`: per-value byte bound - default: "4096"
//! - `STACKD_TTL_SECS`: idle expiry in seconds, 0 disables - default: "3600"
//! - `STACKD_SWEEP_SECS`: expiry sweep interval - default: "60"
//! - `STACKD_LOG_LEVEL`: logging level - default: "info"

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::store::StackRegistry;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 2000;
const DEFAULT_MAX_STACKS: usize = 1000;
const DEFAULT_MAX_DEPTH: usize = 102_400;
const DEFAULT_MAX_VALUE_LEN: usize = 4096;
const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_SWEEP_SECS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for stackd
///
/// Construct with `Default::default()` to load from environment variables
/// with fallback defaults, then adjust fields and call [`validate`].
///
/// [`validate`]: StackdConfig::validate
#[derive(Debug, Clone)]
pub struct StackdConfig {
    /// Listen address
    pub host: String,

    /// Listen port (0 binds an ephemeral port)
    pub port: u16,

    /// Maximum number of live stacks
    pub max_stacks: usize,

    /// Maximum elements per stack
    pub max_depth: usize,

    /// Maximum bytes per pushed value
    pub max_value_len: usize,

    /// Idle expiry in seconds; 0 disables expiry
    pub ttl_secs: u64,

    /// Interval between expiry sweeps, in seconds
    pub sweep_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for StackdConfig {
    fn default() -> Self {
        let host = env::var("STACKD_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = env::var("STACKD_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_stacks = env::var("STACKD_MAX_STACKS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_STACKS);

        let max_depth = env::var("STACKD_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH);

        let max_value_len = env::var("STACKD_MAX_VALUE_LEN")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_VALUE_LEN);

        let ttl_secs = env::var("STACKD_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS);

        let sweep_secs = env::var("STACKD_SWEEP_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SWEEP_SECS);

        let log_level = env::var("STACKD_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            host,
            port,
            max_stacks,
            max_depth,
            max_value_len,
            ttl_secs,
            sweep_secs,
            log_level,
        }
    }
}

impl StackdConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any bound is zero or unreasonably large.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Listen host must not be empty".to_string(),
            ));
        }

        if self.max_stacks == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max stacks must be at least 1".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max stack depth must be at least 1".to_string(),
            ));
        }

        if self.max_value_len == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max value length must be at least 1 byte".to_string(),
            ));
        }
        if self.max_value_len > 1_048_576 {
            return Err(ConfigError::ValidationFailed(
                "Max value length cannot exceed 1MB".to_string(),
            ));
        }

        if self.sweep_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Sweep interval must be at least 1 second".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// The idle TTL as a `Duration`, or `None` when expiry is disabled.
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    /// The address the server binds, `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Creates an empty registry sized by this configuration.
    pub fn build_registry(&self) -> StackRegistry {
        StackRegistry::new(self.max_stacks, self.max_depth, self.ttl())
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> std::collections::HashMap<String, String> {
        let mut map = std::collections::HashMap::new();

        map.insert("host".to_string(), self.host.clone());
        map.insert("port".to_string(), self.port.to_string());
        map.insert("max_stacks".to_string(), self.max_stacks.to_string());
        map.insert("max_depth".to_string(), self.max_depth.to_string());
        map.insert("max_value_len".to_string(), self.max_value_len.to_string());
        map.insert("ttl_secs".to_string(), self.ttl_secs.to_string());
        map.insert("sweep_secs".to_string(), self.sweep_secs.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for StackdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stackd Configuration:")?;
        writeln!(f, "  Listen: {}", self.listen_addr())?;
        writeln!(f, "  Max Stacks: {}", self.max_stacks)?;
        writeln!(f, "  Max Depth: {}", self.max_depth)?;
        writeln!(f, "  Max Value Length: {} bytes", self.max_value_len)?;
        if self.ttl_secs > 0 {
            writeln!(f, "  Idle TTL: {}s (swept every {}s)", self.ttl_secs, self.sweep_secs)?;
        } else {
            writeln!(f, "  Idle TTL: disabled")?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("STACKD_HOST"),
            EnvGuard::unset("STACKD_PORT"),
            EnvGuard::unset("STACKD_MAX_STACKS"),
            EnvGuard::unset("STACKD_TTL_SECS"),
            EnvGuard::unset("STACKD_LOG_LEVEL"),
        ];

        let config = StackdConfig::default();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_stacks, DEFAULT_MAX_STACKS);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_value_len, DEFAULT_MAX_VALUE_LEN);
        assert_eq!(config.ttl_secs, DEFAULT_TTL_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("STACKD_HOST", "0.0.0.0"),
            EnvGuard::set("STACKD_PORT", "9000"),
            EnvGuard::set("STACKD_MAX_STACKS", "10"),
            EnvGuard::set("STACKD_MAX_DEPTH", "64"),
            EnvGuard::set("STACKD_TTL_SECS", "0"),
            EnvGuard::set("STACKD_LOG_LEVEL", "debug"),
        ];

        let config = StackdConfig::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_stacks, 10);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.ttl_secs, 0);
        assert_eq!(config.ttl(), None);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back_to_defaults() {
        let _guards = vec![
            EnvGuard::set("STACKD_PORT", "not-a-port"),
            EnvGuard::set("STACKD_MAX_STACKS", "-3"),
        ];

        let config = StackdConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_stacks, DEFAULT_MAX_STACKS);
    }

    #[test]
    fn test_configuration_validation_valid() {
        let config = StackdConfig {
            host: "127.0.0.1".to_string(),
            port: 2000,
            max_stacks: 1000,
            max_depth: 102_400,
            max_value_len: 4096,
            ttl_secs: 3600,
            sweep_secs: 60,
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configuration_validation_zero_bounds() {
        let mut config = StackdConfig {
            host: "127.0.0.1".to_string(),
            port: 2000,
            max_stacks: 0,
            max_depth: 102_400,
            max_value_len: 4096,
            ttl_secs: 3600,
            sweep_secs: 60,
            log_level: "info".to_string(),
        };
        assert!(config.validate().is_err());

        config.max_stacks = 1;
        config.max_depth = 0;
        assert!(config.validate().is_err());

        config.max_depth = 1;
        config.max_value_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let mut config = StackdConfig {
            host: "127.0.0.1".to_string(),
            port: 2000,
            max_stacks: 1000,
            max_depth: 102_400,
            max_value_len: 4096,
            ttl_secs: 3600,
            sweep_secs: 60,
            log_level: "info".to_string(),
        };
        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_registry_uses_configured_bounds() {
        let config = StackdConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_stacks: 2,
            max_depth: 1,
            max_value_len: 4096,
            ttl_secs: 0,
            sweep_secs: 60,
            log_level: "info".to_string(),
        };

        let registry = config.build_registry();
        let id = registry.create().unwrap();
        let stack = registry.resolve(&id).unwrap();
        stack.push("a".to_string()).unwrap();
        assert!(stack.push("b".to_string()).is_err());

        registry.create().unwrap();
        assert!(registry.create().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = StackdConfig {
            host: "127.0.0.1".to_string(),
            port: 2000,
            max_stacks: 1000,
            max_depth: 102_400,
            max_value_len: 4096,
            ttl_secs: 3600,
            sweep_secs: 60,
            log_level: "info".to_string(),
        };
        let display = format!("{}", config);
        assert!(display.contains("Stackd Configuration:"));
        assert!(display.contains("127.0.0.1:2000"));
    }
}
