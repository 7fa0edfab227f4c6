use std::time::Duration;

use clap::Args;
use serde::Serialize;

/// Connection settings for the catalog database, plus the retry policy used
/// while the pool is being established.
#[derive(Debug, Clone, Args, Serialize)]
pub struct StorageConfig {
    #[arg(
        long = "db-host",
        env = "CINEDB_DB_HOST",
        default_value = "localhost",
        help = "Database host"
    )]
    pub host: String,

    #[arg(
        long = "db-port",
        env = "CINEDB_DB_PORT",
        default_value_t = 5432,
        help = "Database port"
    )]
    pub port: u16,

    #[arg(
        long = "db-name",
        env = "CINEDB_DB_NAME",
        default_value = "postgres",
        help = "Database name"
    )]
    pub database: String,

    #[arg(
        long = "db-user",
        env = "CINEDB_DB_USER",
        default_value = "postgres",
        help = "Database user"
    )]
    pub username: String,

    #[arg(
        long = "db-password",
        env = "CINEDB_DB_PASSWORD",
        default_value = "postgres",
        hide_env_values = true,
        hide_default_value = true,
        help = "Database password"
    )]
    #[serde(skip_serializing)]
    pub password: String,

    #[arg(
        long,
        env = "CINEDB_CONNECT_ATTEMPTS",
        default_value_t = 3,
        help = "How many times to try to open the connection pool before giving up"
    )]
    pub connect_attempts: u32,

    #[arg(
        long,
        env = "CINEDB_RETRY_DELAY",
        default_value = "5s",
        value_parser = humantime::parse_duration,
        help = "Fixed pause between connection attempts in human friendly format (e.g. 500ms, 5s)"
    )]
    #[serde(with = "humantime_duration")]
    pub retry_delay: Duration,

    #[arg(
        long,
        env = "CINEDB_CONNECT_TIMEOUT",
        default_value = "5s",
        value_parser = humantime::parse_duration,
        help = "Time limit for a single connection attempt"
    )]
    #[serde(with = "humantime_duration")]
    pub connect_timeout: Duration,

    #[arg(
        long,
        env = "CINEDB_ACQUIRE_TIMEOUT",
        default_value = "30s",
        value_parser = humantime::parse_duration,
        help = "How long a query waits for a free pooled connection"
    )]
    #[serde(with = "humantime_duration")]
    pub acquire_timeout: Duration,

    #[arg(
        long,
        env = "CINEDB_MAX_CONNECTIONS",
        default_value_t = 20,
        help = "Maximum size of the connection pool"
    )]
    pub max_connections: u32,
}

impl StorageConfig {
    /// Connection target for log and error messages, never includes the password.
    pub fn target(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

mod humantime_duration {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }
}
