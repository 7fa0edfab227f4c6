use clap::{Args, Subcommand};
use cinedb_dal::{
    PageRequest, Pool,
    capability::{GenreCreator, GenreDeleter, GenreGetter, GenreLister, GenreUpdater},
    genre::{CreateGenre, GenreRepository},
};
use uuid::Uuid;

use crate::commands::{Executor, print_deleted, print_id, print_json};

#[derive(Subcommand, Debug)]
pub enum GenreCmd {
    /// Create a genre
    Create {
        #[arg(short, long, help = "Genre name, must be unique")]
        name: String,
    },
    /// Show one genre
    Get { id: Uuid },
    /// List genres ordered by id
    List(ListGenresCmd),
    /// Change the genre name
    Rename {
        id: Uuid,
        #[arg(short, long, help = "New genre name")]
        name: String,
    },
    /// Delete a genre
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
pub struct ListGenresCmd {
    #[arg(long, default_value_t = 100, help = "Genres per page")]
    page_size: u32,
    #[arg(long, default_value_t = 1, help = "Page number, starting at 1")]
    page: u32,
}

impl Executor for GenreCmd {
    async fn run(self, pool: &Pool) -> anyhow::Result<()> {
        let repository = GenreRepository::new(pool.clone());
        match self {
            GenreCmd::Create { name } => create(&repository, name).await,
            GenreCmd::Get { id } => print_json(&repository.get_genre(id).await?),
            GenreCmd::List(cmd) => list(&repository, cmd).await,
            GenreCmd::Rename { id, name } => rename(&repository, id, name).await,
            GenreCmd::Delete { id } => print_deleted(repository.delete_genre(id).await?),
        }
    }
}

async fn create(repository: &impl GenreCreator, name: String) -> anyhow::Result<()> {
    let id = repository.create_genre(CreateGenre { name }).await?;
    print_id(id)
}

async fn list(repository: &impl GenreLister, cmd: ListGenresCmd) -> anyhow::Result<()> {
    let genres = repository
        .list_genres(PageRequest::new(cmd.page_size, cmd.page))
        .await?;
    print_json(&genres)
}

async fn rename(
    repository: &(impl GenreUpdater + GenreGetter),
    id: Uuid,
    name: String,
) -> anyhow::Result<()> {
    repository.update_genre(id, CreateGenre { name }).await?;
    print_json(&repository.get_genre(id).await?)
}
