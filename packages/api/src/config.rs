//! Planner configuration.

use crate::error::ApiError;

/// Environment variable holding the worker address.
pub const WORKER_ADDR_ENV: &str = "PLANNER_WORKER_ADDR";

/// Environment variable requesting a connection to the worker at startup.
pub const CONNECT_ON_START_ENV: &str = "PLANNER_CONNECT_ON_START";

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// `host:port` of the external worker.
    pub worker_address: String,
    /// Open the worker connection during startup instead of on first job.
    pub connect_on_start: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            worker_address: "127.0.0.1:5555".to_string(),
            connect_on_start: false,
        }
    }
}

impl PlannerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(address) = lookup(WORKER_ADDR_ENV) {
            let address = address.trim();
            if address.is_empty() {
                return Err(ApiError::Config(format!("{WORKER_ADDR_ENV} is empty")));
            }
            config.worker_address = address.to_string();
        }

        if let Some(flag) = lookup(CONNECT_ON_START_ENV) {
            config.connect_on_start = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(ApiError::Config(format!(
                        "{CONNECT_ON_START_ENV} must be a boolean, got '{other}'"
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Set the worker address.
    pub fn with_worker_address(mut self, address: impl Into<String>) -> Self {
        self.worker_address = address.into();
        self
    }

    /// Connect to the worker during startup.
    pub fn with_connect_on_start(mut self, connect: bool) -> Self {
        self.connect_on_start = connect;
        self
    }
}
