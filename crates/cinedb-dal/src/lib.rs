pub mod capability;
pub mod connection;
pub mod director;
pub mod error;
pub mod genre;
pub mod links;
pub mod movie;
pub mod user;

pub use connection::{ConnectionError, RetryPolicy, connect};
pub use error::{Error, ErrorKind};
pub use sqlx::Error as SqlxError;

use crate::error::Result;

pub type ChosenDB = sqlx::Postgres;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_PAGE_SIZE: u32 = 10_000;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Applies embedded schema migrations.
pub async fn migrate(pool: &Pool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

pub async fn health_check(pool: &Pool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// One page of a listing. Page numbers start at 1, anything lower is treated
/// as the first page; page size is kept within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_size: u32,
    page_number: u32,
}

impl PageRequest {
    pub fn new(page_size: u32, page_number: u32) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            page_number: page_number.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn limit(&self) -> i64 {
        self.page_size.into()
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page_number) - 1) * i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(100, 1)
    }
}
