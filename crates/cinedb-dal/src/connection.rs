//! Bootstrap of the shared connection pool.
//!
//! The pool is opened once at process start under a bounded retry policy:
//! a fixed number of attempts, each limited by a timeout, separated by a
//! fixed delay. Giving up is reported to the caller as [`ConnectionError`],
//! it is up to the caller to exit, retry later or run degraded.

use std::{fmt::Display, future::Future, time::Duration};

use cinedb_types::StorageConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, info, warn};

use crate::Pool;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Cannot connect to {target} after {attempts} attempt(s): {source}")]
    Exhausted {
        target: String,
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Failure of the last attempt once all attempts are used.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub retry_delay: Duration,
}

impl From<&StorageConfig> for RetryPolicy {
    fn from(config: &StorageConfig) -> Self {
        Self {
            max_attempts: config.connect_attempts,
            attempt_timeout: config.connect_timeout,
            retry_delay: config.retry_delay,
        }
    }
}

impl RetryPolicy {
    /// Zero attempts still means one try.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Runs `attempt` (given 1-based attempt number) until it succeeds or
    /// attempts run out. Waits `retry_delay` between failed attempts, not after
    /// the last one.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.attempts();
        let mut current = 0;
        loop {
            current += 1;
            match attempt(current).await {
                Ok(value) => return Ok(value),
                Err(e) if current >= attempts => {
                    warn!(attempt = current, max_attempts = attempts, error = %e, "Last attempt failed");
                    return Err(Exhausted {
                        attempts: current,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(
                        attempt = current,
                        max_attempts = attempts,
                        error = %e,
                        "Attempt failed, retrying in {:?}",
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}

pub fn connect_options(config: &StorageConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.username)
        .password(&config.password)
}

/// Pool settings for normal operation; bootstrap attempts are limited
/// separately by the retry policy.
pub fn pool_options(config: &StorageConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}

/// Opens the shared pool, retrying according to the config.
pub async fn connect(config: &StorageConfig) -> Result<Pool, ConnectionError> {
    let policy = RetryPolicy::from(config);
    let options = connect_options(config);
    let attempt_timeout = policy.attempt_timeout;

    let pool = policy
        .run(|attempt| {
            let options = options.clone();
            let pending = pool_options(config).connect_with(options);
            async move {
                debug!(attempt, "Opening connection pool");
                match tokio::time::timeout(attempt_timeout, pending).await {
                    Ok(result) => result,
                    Err(_) => Err(sqlx::Error::PoolTimedOut),
                }
            }
        })
        .await
        .map_err(|e| ConnectionError::Exhausted {
            target: config.target(),
            attempts: e.attempts,
            source: e.last_error,
        })?;

    info!(
        database = %config.database,
        username = %config.username,
        host = %config.host,
        port = config.port,
        "Connected to database"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use tokio::time::Instant;
    use tracing_test::traced_test;

    use super::*;

    fn policy(max_attempts: u32, delay_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            attempt_timeout: Duration::from_millis(100),
            retry_delay: Duration::from_millis(delay_ms),
        }
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn test_always_failing_backend() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();
        let mut seen_at = Vec::new();
        let res: Result<(), _> = policy(3, 5000)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                seen_at.push((attempt, started.elapsed()));
                async { Err::<(), _>("connection refused") }
            })
            .await;

        let err = res.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, "connection refused");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let attempts: Vec<u32> = seen_at.iter().map(|(n, _)| *n).collect();
        assert_eq!(attempts, vec![1, 2, 3]);
        for window in seen_at.windows(2) {
            assert_eq!(window[1].1 - window[0].1, Duration::from_secs(5));
        }
        // no pause after the last attempt
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert!(logs_contain("retrying"));
        assert!(logs_contain("Last attempt failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let res = policy(5, 1000)
            .run(|attempt| async move {
                if attempt < 3 {
                    Err("not yet")
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(res.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_means_one() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = policy(0, 1000)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("down") }
            })
            .await;
        assert_eq!(res.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn storage_config() -> StorageConfig {
        StorageConfig {
            host: "127.0.0.1".to_string(),
            // nothing listens on port 1
            port: 1,
            database: "catalog".to_string(),
            username: "cinema".to_string(),
            password: "secret".to_string(),
            connect_attempts: 2,
            retry_delay: Duration::from_millis(10),
            connect_timeout: Duration::from_millis(300),
            acquire_timeout: Duration::from_secs(30),
            max_connections: 2,
        }
    }

    #[test]
    fn test_pool_acquire_timeout_is_independent() {
        let config = storage_config();
        let options = pool_options(&config);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(30));
        assert_ne!(options.get_acquire_timeout(), config.connect_timeout);
        assert_eq!(options.get_max_connections(), 2);
    }

    #[tokio::test]
    async fn test_connect_reports_exhaustion() {
        let config = storage_config();
        let err = connect(&config).await.unwrap_err();
        let ConnectionError::Exhausted {
            target, attempts, ..
        } = &err;
        assert_eq!(*attempts, 2);
        assert_eq!(target, "cinema@127.0.0.1:1/catalog");
        assert!(!err.to_string().contains("secret"));
    }
}
