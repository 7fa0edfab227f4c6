use cinedb_types::StorageConfig;
use clap::{Parser, Subcommand};

use crate::commands::{
    Executor,
    admin::{HealthCmd, MigrateCmd},
    director::DirectorCmd,
    genre::GenreCmd,
    movie::MovieCmd,
    user::UserCmd,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "CLI for cinedb - manages the movie catalog database: schema migrations and genres, directors, users and movies."
)]
pub struct CliConfig {
    #[command(flatten)]
    pub storage: StorageConfig,

    #[arg(
        long,
        env = "CINEDB_LOG_LEVEL",
        default_value = "info",
        help = "Log level or filter directives, RUST_LOG takes precedence"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply schema migrations
    Migrate(MigrateCmd),
    /// Check that the database answers
    Health(HealthCmd),
    #[command(subcommand)]
    Genre(GenreCmd),
    #[command(subcommand)]
    Director(DirectorCmd),
    #[command(subcommand)]
    User(UserCmd),
    #[command(subcommand)]
    Movie(MovieCmd),
}

impl Executor for Command {
    async fn run(self, pool: &cinedb_dal::Pool) -> anyhow::Result<()> {
        match self {
            Command::Migrate(cmd) => cmd.run(pool).await,
            Command::Health(cmd) => cmd.run(pool).await,
            Command::Genre(cmd) => cmd.run(pool).await,
            Command::Director(cmd) => cmd.run(pool).await,
            Command::User(cmd) => cmd.run(pool).await,
            Command::Movie(cmd) => cmd.run(pool).await,
        }
    }
}
