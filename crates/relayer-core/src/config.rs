//! Relayer configuration.

use std::time::Duration;

use sui_relayer_types::env_utils::env_var_or;
use sui_relayer_types::RetryConfig;

/// Default bound on discovery simulations per message.
pub const DEFAULT_MAX_DISCOVERY_ITERATIONS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayerConfig {
    /// Maximum number of discovery simulations before giving up.
    pub max_discovery_iterations: usize,
    /// Polling policy used when a submission is not confirmed locally.
    pub confirmation: RetryConfig,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            max_discovery_iterations: DEFAULT_MAX_DISCOVERY_ITERATIONS,
            confirmation: RetryConfig::default(),
        }
    }
}

impl RelayerConfig {
    /// Read overrides from `RELAYER_MAX_DISCOVERY_ITERATIONS`,
    /// `RELAYER_CONFIRM_ATTEMPTS` and `RELAYER_CONFIRM_DELAY_MS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_discovery_iterations: env_var_or(
                "RELAYER_MAX_DISCOVERY_ITERATIONS",
                defaults.max_discovery_iterations,
            ),
            confirmation: RetryConfig {
                attempts: env_var_or("RELAYER_CONFIRM_ATTEMPTS", defaults.confirmation.attempts),
                delay: Duration::from_millis(env_var_or(
                    "RELAYER_CONFIRM_DELAY_MS",
                    defaults.confirmation.delay.as_millis() as u64,
                )),
            },
        }
    }

    pub fn with_max_discovery_iterations(mut self, iterations: usize) -> Self {
        self.max_discovery_iterations = iterations;
        self
    }

    pub fn with_confirmation(mut self, confirmation: RetryConfig) -> Self {
        self.confirmation = confirmation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayerConfig::default();
        assert_eq!(config.max_discovery_iterations, 16);
        assert_eq!(config.confirmation.attempts, 10);
        assert_eq!(config.confirmation.delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("RELAYER_MAX_DISCOVERY_ITERATIONS", "4");
        std::env::set_var("RELAYER_CONFIRM_DELAY_MS", "25");
        let config = RelayerConfig::from_env();
        std::env::remove_var("RELAYER_MAX_DISCOVERY_ITERATIONS");
        std::env::remove_var("RELAYER_CONFIRM_DELAY_MS");

        assert_eq!(config.max_discovery_iterations, 4);
        assert_eq!(config.confirmation.delay, Duration::from_millis(25));
    }
}
