//! Persistence for users and their tasks.
//!
//! Handlers and services talk to a [`Store`] trait object. [`PgStore`] is the
//! production adapter; [`MemoryStore`] keeps everything in process and is what
//! the test suites run against.
//!
//! Every task operation takes the owner's id and matches on `id` and `owner_id`
//! together, so a task belonging to someone else is indistinguishable from one
//! that does not exist.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user. A duplicate email yields `AppError::BadRequest`.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Removes a user and, with it, every task they own. Returns whether a user was removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;

    async fn create_task(&self, owner_id: Uuid, task: NewTask) -> Result<Task, AppError>;

    /// The owner's tasks in creation order.
    async fn list_tasks(&self, owner_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Task>, AppError>;

    async fn get_task(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError>;

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    /// Returns whether a task was removed.
    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn duplicate_email() -> AppError {
    AppError::BadRequest("Email already registered".into())
}
