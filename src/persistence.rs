//! Persistence collaborator: writes the resolution map into Redis.
//!
//! Grounded in the original `pkg/storage/redis.go`'s `NewRedisClient` (connect
//! and ping once); here built on the `redis` crate instead of a hand-rolled
//! client, since none of the teacher's or pack's crates touch Redis. Failures
//! are caught and logged, never propagated past this module as anything
//! stronger than a warning.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::SysmapError;

/// The fixed key holding the set of distinct kernel syscall names observed
/// across a run.
const CALLABLE_SYSCALLS_SET: &str = "cluster_callable_syscalls";

/// A connected Redis sink for resolution results.
pub struct RedisSink {
    client: redis::Client,
}

impl RedisSink {
    /// Builds a client from `config` and pings it to fail fast on a bad address.
    ///
    /// # Errors
    ///
    /// Returns [`SysmapError::PersistenceFailed`] if the address is invalid
    /// or the connection/ping fails.
    pub fn connect(config: &Config) -> Result<Self, SysmapError> {
        let url = if config.redis_password.is_empty() {
            format!("redis://{}/", config.redis_addr)
        } else {
            format!("redis://:{}@{}/", config.redis_password, config.redis_addr)
        };

        let client = redis::Client::open(url).map_err(|e| SysmapError::PersistenceFailed(e.into()))?;
        let mut conn = client
            .get_connection()
            .map_err(|e| SysmapError::PersistenceFailed(e.into()))?;
        redis::cmd("PING")
            .query::<String>(&mut conn)
            .map_err(|e| SysmapError::PersistenceFailed(e.into()))?;

        Ok(Self { client })
    }

    /// Writes one `SET wrapper kernel_syscall` per entry, then one `SADD` per
    /// distinct kernel syscall name into [`CALLABLE_SYSCALLS_SET`].
    ///
    /// # Errors
    ///
    /// Returns [`SysmapError::PersistenceFailed`] if any command fails. The
    /// caller is expected to log and continue; this never affects the JSON
    /// output already produced.
    pub fn persist(&self, resolution: &HashMap<String, String>) -> Result<(), SysmapError> {
        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| SysmapError::PersistenceFailed(e.into()))?;

        let mut distinct_names = std::collections::HashSet::new();
        for (wrapper, kernel_name) in resolution {
            redis::cmd("SET")
                .arg(wrapper)
                .arg(kernel_name)
                .exec(&mut conn)
                .map_err(|e| SysmapError::PersistenceFailed(e.into()))?;
            distinct_names.insert(kernel_name.clone());
        }

        for name in distinct_names {
            redis::cmd("SADD")
                .arg(CALLABLE_SYSCALLS_SET)
                .arg(name)
                .exec(&mut conn)
                .map_err(|e| SysmapError::PersistenceFailed(e.into()))?;
        }

        Ok(())
    }
}
