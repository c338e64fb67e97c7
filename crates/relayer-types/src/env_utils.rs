//! Environment variable parsing utilities.
//!
//! # Example
//!
//! ```
//! use sui_relayer_types::env_utils::{env_var, env_var_or};
//!
//! let iterations: usize = env_var_or("RELAYER_MAX_DISCOVERY_ITERATIONS", 16);
//! let custom: Option<u64> = env_var("CUSTOM_VALUE");
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}
