use clap::{Args, Subcommand};
use cinedb_dal::{
    Pool,
    capability::{DirectorCreator, DirectorGetter},
    director::{CreateDirector, DirectorRepository},
};
use time::{Date, macros::format_description};
use uuid::Uuid;

use crate::commands::{Executor, print_id, print_json};

#[derive(Subcommand, Debug)]
pub enum DirectorCmd {
    /// Create a director
    Create(CreateDirectorCmd),
    /// Show one director
    Get { id: Uuid },
}

#[derive(Args, Debug)]
pub struct CreateDirectorCmd {
    #[arg(long, help = "First name")]
    first_name: String,
    #[arg(long, help = "Last name")]
    last_name: String,
    #[arg(long, default_value = "", help = "Country of origin")]
    country: String,
    #[arg(long, value_parser = parse_date, help = "Birth date as YYYY-MM-DD")]
    birth_date: Date,
    #[arg(long, help = "Director has won an Oscar")]
    has_oscar: bool,
}

fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
}

impl Executor for DirectorCmd {
    async fn run(self, pool: &Pool) -> anyhow::Result<()> {
        let repository = DirectorRepository::new(pool.clone());
        match self {
            DirectorCmd::Create(cmd) => create(&repository, cmd).await,
            DirectorCmd::Get { id } => get(&repository, id).await,
        }
    }
}

async fn create(repository: &impl DirectorCreator, cmd: CreateDirectorCmd) -> anyhow::Result<()> {
    let id = repository
        .create_director(CreateDirector {
            first_name: cmd.first_name,
            last_name: cmd.last_name,
            country: cmd.country,
            birth_date: cmd.birth_date,
            has_oscar: cmd.has_oscar,
        })
        .await?;
    print_id(id)
}

async fn get(repository: &impl DirectorGetter, id: Uuid) -> anyhow::Result<()> {
    print_json(&repository.get_director(id).await?)
}
