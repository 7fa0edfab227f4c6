use clap::{Args, Subcommand};
use cinedb_dal::{
    Pool,
    capability::{MovieCreator, MovieDeleter, MovieGetter},
    links::DEFAULT_MAX_IN_FLIGHT,
    movie::{CreateMovie, MovieRepository},
};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use crate::commands::{Executor, print_deleted, print_id, print_json};

#[derive(Subcommand, Debug)]
pub enum MovieCmd {
    /// Create a movie together with its genres
    Create(CreateMovieCmd),
    /// Show one movie with its genres
    Get { id: Uuid },
    /// Delete a movie and its genre links
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
pub struct CreateMovieCmd {
    #[arg(short, long, help = "Movie title")]
    pub name: String,
    #[arg(long, default_value = "", help = "Plot description")]
    pub description: String,
    #[arg(long, help = "Duration in seconds")]
    pub duration: i32,
    #[arg(long, help = "Rating between 0 and 10")]
    pub rating: f64,
    #[arg(long = "director", help = "Director id")]
    pub director_id: Uuid,
    #[arg(long = "genre", num_args = 0.., value_delimiter = ',',
        help = "Genre id, comma separated or used multiple times")]
    pub genres: Vec<Uuid>,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_IN_FLIGHT,
        help = "Maximum genre links written at once"
    )]
    pub max_in_flight: usize,
}

impl Executor for MovieCmd {
    async fn run(self, pool: &Pool) -> anyhow::Result<()> {
        match self {
            MovieCmd::Create(cmd) => {
                let repository =
                    MovieRepository::with_max_in_flight(pool.clone(), cmd.max_in_flight);
                create(&repository, cmd).await
            }
            MovieCmd::Get { id } => get(&MovieRepository::new(pool.clone()), id).await,
            MovieCmd::Delete { id } => {
                let repository = MovieRepository::new(pool.clone());
                print_deleted(repository.delete_movie(id).await?)
            }
        }
    }
}

async fn create(repository: &impl MovieCreator, cmd: CreateMovieCmd) -> anyhow::Result<()> {
    let payload = CreateMovie {
        name: cmd.name,
        description: cmd.description,
        duration: cmd.duration,
        rating: cmd.rating,
        director_id: cmd.director_id,
        genre_ids: cmd.genres,
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending genre links");
            interrupt.cancel();
        }
    });
    let res = repository.create_movie(payload, &cancel).await;
    watcher.abort();

    print_id(res?)
}

async fn get(repository: &impl MovieGetter, id: Uuid) -> anyhow::Result<()> {
    print_json(&repository.get_movie(id).await?)
}
