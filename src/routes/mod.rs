pub mod auth;
pub mod health;
pub mod json;
pub mod tasks;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

/// Answers requests that match no route or method with the common error body.
async fn fallback() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Not found".into()))
}

/// Registers every route together with the extractor configuration that turns
/// malformed input into the common error body.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::from(err).into()))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::from(err).into()))
        // Only task ids travel in the path; an unparseable one cannot name a task.
        .app_data(web::PathConfig::default().error_handler(|_err, _req| {
            AppError::NotFound("Task not found".into()).into()
        }))
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh)
                .service(auth::me),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .default_service(web::route().to(fallback));
}
