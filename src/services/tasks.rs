//! Owner-scoped task operations.
//!
//! Every function takes the authenticated user and only ever touches tasks
//! whose `owner_id` is that user's id. Asking for somebody else's task gives
//! the same `NotFound` as asking for one that was never created.

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskInput, TaskQuery, TaskUpdateInput, User};
use crate::store::Store;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Creates a task owned by `owner`, whatever owner the client may have claimed.
pub async fn create(store: &dyn Store, owner: &User, input: TaskInput) -> Result<Task, AppError> {
    input.validate()?;
    store.create_task(owner.id, NewTask::from(input)).await
}

pub async fn list(store: &dyn Store, owner: &User, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let (limit, offset) = query.pagination();
    store.list_tasks(owner.id, limit, offset).await
}

pub async fn get(store: &dyn Store, owner: &User, id: Uuid) -> Result<Task, AppError> {
    store
        .get_task(owner.id, id)
        .await?
        .ok_or_else(task_not_found)
}

/// Applies a partial update; fields the client left out keep their value.
pub async fn update(
    store: &dyn Store,
    owner: &User,
    id: Uuid,
    input: TaskUpdateInput,
) -> Result<Task, AppError> {
    input.validate()?;
    store
        .update_task(owner.id, id, input.into())
        .await?
        .ok_or_else(task_not_found)
}

pub async fn delete(store: &dyn Store, owner: &User, id: Uuid) -> Result<(), AppError> {
    if store.delete_task(owner.id, id).await? {
        Ok(())
    } else {
        Err(task_not_found())
    }
}
