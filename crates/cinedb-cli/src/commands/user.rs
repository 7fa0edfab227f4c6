use clap::{Args, Subcommand};
use cinedb_dal::{
    Pool,
    capability::{
        UserCreator, UserDeleter, UserGetter, UserNameUpdater, UserPasswordChecker,
        UserPasswordUpdater,
    },
    user::{CreateUser, UserRepository},
};
use uuid::Uuid;

use crate::commands::{Executor, print_deleted, print_id, print_json};

#[derive(Subcommand, Debug)]
pub enum UserCmd {
    /// Create a user
    Create(CreateUserCmd),
    /// Show one user
    Get { id: Uuid },
    /// Change the user name
    Rename {
        id: Uuid,
        #[arg(short, long, help = "New user name")]
        name: String,
    },
    /// Set a new password
    SetPassword {
        id: Uuid,
        #[arg(short, long, env = "CINEDB_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check user name and password
    CheckPassword {
        #[arg(short, long, help = "User name")]
        name: String,
        #[arg(short, long, env = "CINEDB_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete a user
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
pub struct CreateUserCmd {
    #[arg(short, long, help = "User name, must be unique")]
    name: String,
    #[arg(short, long, help = "User email, must be unique")]
    email: String,
    #[arg(short, long, env = "CINEDB_USER_PASSWORD", hide_env_values = true)]
    password: String,
}

impl Executor for UserCmd {
    async fn run(self, pool: &Pool) -> anyhow::Result<()> {
        let repository = UserRepository::new(pool.clone());
        match self {
            UserCmd::Create(cmd) => create(&repository, cmd).await,
            UserCmd::Get { id } => print_json(&repository.get_user(id).await?),
            UserCmd::Rename { id, name } => rename(&repository, id, &name).await,
            UserCmd::SetPassword { id, password } => {
                set_password(&repository, id, &password).await
            }
            UserCmd::CheckPassword { name, password } => {
                check_password(&repository, &name, &password).await
            }
            UserCmd::Delete { id } => print_deleted(repository.delete_user(id).await?),
        }
    }
}

async fn create(repository: &impl UserCreator, cmd: CreateUserCmd) -> anyhow::Result<()> {
    let id = repository
        .create_user(CreateUser {
            name: cmd.name,
            password: cmd.password,
            email: cmd.email,
        })
        .await?;
    print_id(id)
}

async fn rename(
    repository: &(impl UserNameUpdater + UserGetter),
    id: Uuid,
    name: &str,
) -> anyhow::Result<()> {
    repository.update_user_name(id, name).await?;
    print_json(&repository.get_user(id).await?)
}

async fn set_password(
    repository: &impl UserPasswordUpdater,
    id: Uuid,
    password: &str,
) -> anyhow::Result<()> {
    repository.update_user_password(id, password).await?;
    print_json(&serde_json::json!({ "id": id, "password_changed": true }))
}

async fn check_password(
    repository: &impl UserPasswordChecker,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let valid = repository.check_user_password(name, password).await?;
    print_json(&serde_json::json!({ "name": name, "valid": valid }))
}
