use clap::Args;
use cinedb_dal::Pool;
use tracing::info;

use crate::commands::{Executor, print_json};

#[derive(Args, Debug)]
pub struct MigrateCmd {}

impl Executor for MigrateCmd {
    async fn run(self, pool: &Pool) -> anyhow::Result<()> {
        cinedb_dal::migrate(pool).await?;
        info!("Database schema is up to date");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct HealthCmd {}

impl Executor for HealthCmd {
    async fn run(self, pool: &Pool) -> anyhow::Result<()> {
        cinedb_dal::health_check(pool).await?;
        print_json(&serde_json::json!({ "status": "ok" }))
    }
}
