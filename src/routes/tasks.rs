use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdateInput},
    services, AppState,
};
use super::json::JsonBody;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves a page of the authenticated user's tasks.
///
/// Tasks come back in creation order, so a given `limit`/`offset` pair always
/// selects the same tasks while the data is unchanged.
///
/// ## Query Parameters:
/// - `limit` (optional): page size, default 10, clamped to 1..=100.
/// - `offset` (optional): number of tasks to skip, default 0.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `422 Unprocessable Entity`: non-numeric `limit` or `offset`.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = services::tasks::list(state.store.as_ref(), &user.0, &query).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: required, non-empty.
/// - `description` (optional).
/// - `status` (optional): `TODO`, `IN_PROGRESS` or `DONE`; defaults to `TODO`.
///
/// Any `owner_id` in the body is ignored; other unknown fields are rejected.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `422 Unprocessable Entity`: missing/empty title, bad status, unknown field.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_data: JsonBody<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::create(state.store.as_ref(), &user.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::get(state.store.as_ref(), &user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates an existing task.
///
/// Only the fields present in the body change. `"description": null` clears
/// the description.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: empty title, bad status, unknown field.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    task_data: JsonBody<TaskUpdateInput>,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::update(
        state.store.as_ref(),
        &user.0,
        task_id.into_inner(),
        task_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    services::tasks::delete(state.store.as_ref(), &user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
