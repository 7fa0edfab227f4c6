use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, PageRequest, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateGenre {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

pub type GenreRepository = GenreRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Uuid> {
        payload.validate()?;
        let id: Uuid = sqlx::query_scalar("INSERT INTO genres (name) VALUES ($1) RETURNING id")
            .bind(&payload.name)
            .fetch_one(&self.executor)
            .await?;
        debug!(%id, name = %payload.name, "Created genre");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::not_found("Genre", id))
    }

    /// Genres ordered by id; a page past the end is just empty.
    pub async fn list(&self, page: PageRequest) -> Result<Vec<Genre>> {
        debug!(
            page_size = page.page_size(),
            page_number = page.page_number(),
            "Listing genres"
        );
        let records =
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id LIMIT $1 OFFSET $2")
                .bind(page.limit())
                .bind(page.offset())
                .fetch(&self.executor)
                .try_collect::<Vec<_>>()
                .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genres")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    pub async fn update(&self, id: Uuid, payload: CreateGenre) -> Result<()> {
        payload.validate()?;
        let result = sqlx::query("UPDATE genres SET name = $1 WHERE id = $2")
            .bind(&payload.name)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::not_found("Genre", id))
        } else {
            debug!(%id, name = %payload.name, "Renamed genre");
            Ok(())
        }
    }

    /// Returns `true` if a genre was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            debug!(%id, "No genre to delete");
        }
        Ok(res.rows_affected() > 0)
    }
}
