use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateDirector {
    #[garde(length(min = 1, max = 255))]
    pub first_name: String,
    #[garde(length(min = 1, max = 255))]
    pub last_name: String,
    #[garde(length(max = 255))]
    pub country: String,
    #[garde(skip)]
    pub birth_date: time::Date,
    #[garde(skip)]
    #[serde(default)]
    pub has_oscar: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Director {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub birth_date: time::Date,
    pub has_oscar: bool,
}

pub type DirectorRepository = DirectorRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct DirectorRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> DirectorRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateDirector) -> Result<Uuid> {
        payload.validate()?;
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO directors (first_name, last_name, country, birth_date, has_oscar) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.country)
        .bind(payload.birth_date)
        .bind(payload.has_oscar)
        .fetch_one(&self.executor)
        .await?;
        debug!(%id, last_name = %payload.last_name, "Created director");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Director> {
        sqlx::query_as::<_, Director>(
            "SELECT id, first_name, last_name, country, birth_date, has_oscar \
             FROM directors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::not_found("Director", id))
    }
}
