//! Tracing subscriber initialisation.
//!
//! Crypto events are emitted under the `crypto` target; set
//! `RUST_LOG=crypto=debug` to see key lifecycle events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::env::{EnvLookup, parse_var};
use crate::error::ConfigError;

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Application name, attached to the startup event
    pub service_name: String,
    /// Log level filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "context-capsule".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Overlays `CAPSULE_LOG_LEVEL` and `CAPSULE_LOG_JSON` from `env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if `CAPSULE_LOG_JSON` is not a boolean.
    pub fn from_lookup<E: EnvLookup + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(level) = env.get("CAPSULE_LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.log_level = level.trim().to_string();
        }
        if let Some(json) = parse_var::<bool, _>(env, "CAPSULE_LOG_JSON")? {
            config.json_output = json;
        }
        Ok(config)
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Initialize tracing with the given configuration.
///
/// This sets up the global tracing subscriber. Should be called once at
/// application startup; later calls are ignored.
pub fn init_tracing(config: &TracingConfig) {
    if try_init_tracing(config).is_ok() {
        tracing::info!(service = %config.service_name, "Tracing initialized");
    }
}

/// Initialize tracing, reporting whether a global subscriber was already set.
///
/// # Errors
///
/// Returns the subscriber error if a global default is already installed.
pub fn try_init_tracing(
    config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    if config.json_output {
        tracing_subscriber::registry()
            .with(config.filter())
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(config.filter())
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    }
}
