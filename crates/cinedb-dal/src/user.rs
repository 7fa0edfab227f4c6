use garde::Validate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::Pool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Error, error::Result};

/// Passwords are kept only as a lowercase hex SHA-256 digest.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    base16ct::lower::encode_string(&digest)
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateUser {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(length(min = 1, max = 255))]
    #[serde(skip_serializing)]
    pub password: String,
    #[garde(email)]
    pub email: String,
}

#[derive(Validate)]
struct NameChange<'a> {
    #[garde(length(min = 1, max = 255))]
    name: &'a str,
}

#[derive(Validate)]
struct PasswordChange<'a> {
    #[garde(length(min = 1, max = 255))]
    password: &'a str,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub type UserRepository = UserRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct UserRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> UserRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateUser) -> Result<Uuid> {
        payload.validate()?;
        let password_hash = hash_password(&payload.password);
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (name, password_hash, email) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&payload.name)
        .bind(&password_hash)
        .bind(&payload.email)
        .fetch_one(&self.executor)
        .await?;
        info!(%id, name = %payload.name, "Created user");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::not_found("User", id))
    }

    pub async fn update_name(&self, id: Uuid, name: &str) -> Result<()> {
        NameChange { name }.validate()?;
        let result = sqlx::query("UPDATE users SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", id));
        }
        debug!(%id, "Updated user name");
        Ok(())
    }

    pub async fn update_password(&self, id: Uuid, password: &str) -> Result<()> {
        PasswordChange { password }.validate()?;
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash_password(password))
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", id));
        }
        info!(%id, "Updated user password");
        Ok(())
    }

    /// Returns `true` if a user was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.executor)
            .await?;
        debug!(%id, deleted = res.rows_affected(), "Deleted user");
        Ok(res.rows_affected() > 0)
    }

    pub async fn check_password(&self, name: &str, password: &str) -> Result<bool> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.executor)
                .await?;
        Ok(stored.is_some_and(|hash| hash == hash_password(password)))
    }
}
