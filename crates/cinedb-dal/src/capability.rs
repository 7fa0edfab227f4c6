//! Single-operation traits, so a caller can depend on exactly what it uses
//! ("can create a genre") instead of a whole repository.
#![allow(async_fn_in_trait)]

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    PageRequest,
    director::{CreateDirector, Director, DirectorRepository},
    error::Result,
    genre::{CreateGenre, Genre, GenreRepository},
    movie::{CreateMovie, Movie, MovieRepository},
    user::{CreateUser, User, UserRepository},
};

pub trait GenreCreator {
    async fn create_genre(&self, payload: CreateGenre) -> Result<Uuid>;
}

pub trait GenreGetter {
    async fn get_genre(&self, id: Uuid) -> Result<Genre>;
}

pub trait GenreLister {
    async fn list_genres(&self, page: PageRequest) -> Result<Vec<Genre>>;
}

pub trait GenreUpdater {
    async fn update_genre(&self, id: Uuid, payload: CreateGenre) -> Result<()>;
}

pub trait GenreDeleter {
    async fn delete_genre(&self, id: Uuid) -> Result<bool>;
}

pub trait DirectorCreator {
    async fn create_director(&self, payload: CreateDirector) -> Result<Uuid>;
}

pub trait DirectorGetter {
    async fn get_director(&self, id: Uuid) -> Result<Director>;
}

pub trait UserCreator {
    async fn create_user(&self, payload: CreateUser) -> Result<Uuid>;
}

pub trait UserGetter {
    async fn get_user(&self, id: Uuid) -> Result<User>;
}

pub trait UserNameUpdater {
    async fn update_user_name(&self, id: Uuid, name: &str) -> Result<()>;
}

pub trait UserPasswordUpdater {
    async fn update_user_password(&self, id: Uuid, password: &str) -> Result<()>;
}

pub trait UserPasswordChecker {
    async fn check_user_password(&self, name: &str, password: &str) -> Result<bool>;
}

pub trait UserDeleter {
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
}

pub trait MovieCreator {
    async fn create_movie(&self, payload: CreateMovie, cancel: &CancellationToken)
    -> Result<Uuid>;
}

pub trait MovieGetter {
    async fn get_movie(&self, id: Uuid) -> Result<Movie>;
}

pub trait MovieDeleter {
    async fn delete_movie(&self, id: Uuid) -> Result<bool>;
}

impl GenreCreator for GenreRepository {
    async fn create_genre(&self, payload: CreateGenre) -> Result<Uuid> {
        self.create(payload).await
    }
}

impl GenreGetter for GenreRepository {
    async fn get_genre(&self, id: Uuid) -> Result<Genre> {
        self.get(id).await
    }
}

impl GenreLister for GenreRepository {
    async fn list_genres(&self, page: PageRequest) -> Result<Vec<Genre>> {
        self.list(page).await
    }
}

impl GenreUpdater for GenreRepository {
    async fn update_genre(&self, id: Uuid, payload: CreateGenre) -> Result<()> {
        self.update(id, payload).await
    }
}

impl GenreDeleter for GenreRepository {
    async fn delete_genre(&self, id: Uuid) -> Result<bool> {
        self.delete(id).await
    }
}

impl DirectorCreator for DirectorRepository {
    async fn create_director(&self, payload: CreateDirector) -> Result<Uuid> {
        self.create(payload).await
    }
}

impl DirectorGetter for DirectorRepository {
    async fn get_director(&self, id: Uuid) -> Result<Director> {
        self.get(id).await
    }
}

impl UserCreator for UserRepository {
    async fn create_user(&self, payload: CreateUser) -> Result<Uuid> {
        self.create(payload).await
    }
}

impl UserGetter for UserRepository {
    async fn get_user(&self, id: Uuid) -> Result<User> {
        self.get(id).await
    }
}

impl UserNameUpdater for UserRepository {
    async fn update_user_name(&self, id: Uuid, name: &str) -> Result<()> {
        self.update_name(id, name).await
    }
}

impl UserPasswordUpdater for UserRepository {
    async fn update_user_password(&self, id: Uuid, password: &str) -> Result<()> {
        self.update_password(id, password).await
    }
}

impl UserPasswordChecker for UserRepository {
    async fn check_user_password(&self, name: &str, password: &str) -> Result<bool> {
        self.check_password(name, password).await
    }
}

impl UserDeleter for UserRepository {
    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.delete(id).await
    }
}

impl MovieCreator for MovieRepository {
    async fn create_movie(
        &self,
        payload: CreateMovie,
        cancel: &CancellationToken,
    ) -> Result<Uuid> {
        self.create_with_cancel(payload, cancel).await
    }
}

impl MovieGetter for MovieRepository {
    async fn get_movie(&self, id: Uuid) -> Result<Movie> {
        self.get(id).await
    }
}

impl MovieDeleter for MovieRepository {
    async fn delete_movie(&self, id: Uuid) -> Result<bool> {
        self.delete(id).await
    }
}
