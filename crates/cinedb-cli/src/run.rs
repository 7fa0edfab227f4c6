use anyhow::Result;
use tracing::debug;

use crate::{commands::Executor as _, config::CliConfig};

pub async fn run(config: CliConfig) -> Result<()> {
    debug!(target = %config.storage.target(), "Starting");
    let pool = cinedb_dal::connect(&config.storage).await?;
    let res = config.command.run(&pool).await;
    pool.close().await;
    res
}
