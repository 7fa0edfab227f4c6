use serde::Serialize;

pub mod admin;
pub mod director;
pub mod genre;
pub mod movie;
pub mod user;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self, pool: &cinedb_dal::Pool) -> anyhow::Result<()>;
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_id(id: uuid::Uuid) -> anyhow::Result<()> {
    print_json(&serde_json::json!({ "id": id }))
}

pub(crate) fn print_deleted(deleted: bool) -> anyhow::Result<()> {
    print_json(&serde_json::json!({ "deleted": deleted }))
}
