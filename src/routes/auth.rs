use crate::{
    auth::{CurrentUser, LoginRequest, RefreshRequest, RegisterRequest},
    error::AppError,
    models::UserResponse,
    services, AppState,
};
use super::json::JsonBody;
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates an account and returns it without any password material.
/// Answers 400 when the email is already registered and 422 on invalid input.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: JsonBody<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = services::auth::register(state.store.as_ref(), register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Returns an access token and a refresh token. Wrong email and wrong
/// password produce the same 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: JsonBody<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let pair =
        services::auth::login(state.store.as_ref(), &state.tokens, login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Refresh tokens
///
/// Trades a valid refresh token for a brand new token pair.
#[post("/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    body: JsonBody<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let pair =
        services::auth::refresh(state.store.as_ref(), &state.tokens, &body.0.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Current user
#[get("/me")]
pub async fn me(user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}
