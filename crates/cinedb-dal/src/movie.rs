use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    Error, Pool,
    error::Result,
    genre::Genre,
    links::{DEFAULT_MAX_IN_FLIGHT, GenreLinkWriter, distinct},
};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateMovie {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    /// Seconds
    #[garde(range(min = 0))]
    pub duration: i32,
    #[garde(custom(is_valid_rating))]
    pub rating: f64,
    #[garde(skip)]
    pub director_id: Uuid,
    #[garde(skip)]
    #[serde(default)]
    pub genre_ids: Vec<Uuid>,
}

fn is_valid_rating(rating: &f64, _ctx: &()) -> garde::Result {
    if rating.is_finite() && (0.0..=10.0).contains(rating) {
        Ok(())
    } else {
        Err(garde::Error::new("rating must be a number between 0 and 10"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration: i32,
    pub rating: f64,
    pub director_id: Uuid,
    pub genres: Vec<Genre>,
}

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    name: String,
    description: String,
    duration: i32,
    rating: f64,
    director_id: Uuid,
}

impl MovieRow {
    fn with_genres(self, genres: Vec<Genre>) -> Movie {
        Movie {
            id: self.id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            rating: self.rating,
            director_id: self.director_id,
            genres,
        }
    }
}

/// Movies and their genre set. Holds the pool itself rather than a generic
/// executor, genre links are written from separate tasks.
#[derive(Clone)]
pub struct MovieRepository {
    pool: Pool,
    links: GenreLinkWriter,
}

impl MovieRepository {
    pub fn new(pool: Pool) -> Self {
        Self::with_max_in_flight(pool, DEFAULT_MAX_IN_FLIGHT)
    }

    /// `max_in_flight` caps concurrent genre link writes of a single create.
    pub fn with_max_in_flight(pool: Pool, max_in_flight: usize) -> Self {
        let links = GenreLinkWriter::new(pool.clone(), max_in_flight);
        Self { pool, links }
    }

    pub async fn create(&self, payload: CreateMovie) -> Result<Uuid> {
        self.create_with_cancel(payload, &CancellationToken::new())
            .await
    }

    /// Inserts the movie, then links it to every genre concurrently. If any
    /// link fails the movie and all of its links are removed again and the
    /// error carries every link failure.
    ///
    /// The write runs on its own task: dropping the returned future does not
    /// interrupt it, so a movie is never left half linked.
    pub async fn create_with_cancel(
        &self,
        payload: CreateMovie,
        cancel: &CancellationToken,
    ) -> Result<Uuid> {
        payload.validate()?;
        let repository = self.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { repository.insert_linked(payload, &cancel).await })
            .await
            .map_err(|e| Error::TaskFailed(e.to_string()))?
    }

    async fn insert_linked(
        &self,
        payload: CreateMovie,
        cancel: &CancellationToken,
    ) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO movies (name, description, duration, rating, director_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.duration)
        .bind(payload.rating)
        .bind(payload.director_id)
        .fetch_one(&self.pool)
        .await?;

        let genre_ids = distinct(&payload.genre_ids);
        debug!(%id, genres = genre_ids.len(), "Created movie row, linking genres");

        if let Err(e) = self.links.link_all(id, &genre_ids, cancel).await {
            warn!(%id, error = %e, "Linking genres failed, removing movie");
            match remove(&self.pool, id).await {
                Ok(_) => debug!(%id, "Movie removed after failed linking"),
                Err(cleanup) => {
                    error!(%id, error = %cleanup, "Cannot remove movie after failed linking")
                }
            }
            return Err(e);
        }

        info!(%id, name = %payload.name, genres = genre_ids.len(), "Created movie");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Movie> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT id, name, description, duration, rating, director_id \
             FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found("Movie", id))?;

        let genres = self.genres(id).await?;
        Ok(row.with_genres(genres))
    }

    /// Genres linked to the movie, by name. Empty for unknown movies.
    pub async fn genres(&self, movie_id: Uuid) -> Result<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name FROM genres g \
             JOIN movies_genres mg ON g.id = mg.genre_id \
             WHERE mg.movie_id = $1 ORDER BY g.name",
        )
        .bind(movie_id)
        .fetch(&self.pool)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(genres)
    }

    /// Removes the movie with its genre links. Returns `true` if it existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        remove(&self.pool, id).await
    }
}

async fn remove(pool: &Pool, id: Uuid) -> Result<bool> {
    let mut transaction = pool.begin().await?;
    sqlx::query("DELETE FROM movies_genres WHERE movie_id = $1")
        .bind(id)
        .execute(&mut *transaction)
        .await?;
    let res = sqlx::query("DELETE FROM movies WHERE id = $1")
        .bind(id)
        .execute(&mut *transaction)
        .await?;
    transaction.commit().await?;
    Ok(res.rows_affected() > 0)
}
