//! Process configuration, resolved once at startup.
//!
//! Mirrors the original tool's `pkg/config` package: a handful of free-standing
//! environment lookups with hard-coded defaults, not a TOML-driven settings
//! object — this tool's configuration surface is narrow enough that a config
//! file would be ceremony.

use std::path::PathBuf;

/// Default path to the C library analyzed as the wrapper source.
const DEFAULT_LIBC_PATH: &str = "/lib/x86_64-linux-gnu/libc.so.6";

/// Default Redis address when `REDIS_ADDR` is unset.
const DEFAULT_REDIS_ADDR: &str = "localhost:6379";

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the Redis instance results are persisted to.
    pub redis_addr: String,
    /// Redis password, empty when unset.
    pub redis_password: String,
    /// Path to the C library to mine for syscall wrappers.
    pub libc_path: PathBuf,
}

impl Config {
    /// Resolve configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let redis_addr = std::env::var("REDIS_ADDR").unwrap_or_else(|_| {
            tracing::info!(
                default = DEFAULT_REDIS_ADDR,
                "REDIS_ADDR not set, using default"
            );
            DEFAULT_REDIS_ADDR.to_string()
        });
        let redis_password = std::env::var("REDIS_PASSWORD").unwrap_or_default();
        let libc_path = std::env::var("SYSMAP_LIBC_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_LIBC_PATH), PathBuf::from);

        Self {
            redis_addr,
            redis_password,
            libc_path,
        }
    }
}
