//! Registration, login and token refresh.

use validator::Validate;

use crate::auth::token::{Claims, TokenKind, TokenPair, TokenService};
use crate::auth::{hash_password, verify_password, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Could not validate credentials".into())
}

/// Creates an account. Fails with `BadRequest` when the email is taken.
pub async fn register(store: &dyn Store, request: RegisterRequest) -> Result<User, AppError> {
    request.validate()?;

    if store.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    // bcrypt is CPU-bound; run it off the async workers.
    let password = request.password;
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))??;

    let user = store.create_user(&request.email, &hashed).await?;
    log::info!("registered user {}", user.id);
    Ok(user)
}

/// Checks credentials and issues a fresh token pair.
pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    request: LoginRequest,
) -> Result<TokenPair, AppError> {
    request.validate()?;

    let wrong_credentials = || AppError::Unauthorized("Incorrect email or password".into());
    let user = store
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(wrong_credentials)?;

    let password = request.password;
    let hashed = user.hashed_password.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .map_err(|e| AppError::InternalServerError(format!("verification task failed: {}", e)))?;
    if !matches {
        log::debug!("failed login for user {}", user.id);
        return Err(wrong_credentials());
    }

    let pair = tokens.issue_pair(&user.email)?;
    log::info!("user {} logged in", user.id);
    Ok(pair)
}

/// Exchanges a refresh token for a new access token and a new refresh token.
///
/// The presented refresh token is not revoked and stays usable until it expires.
pub async fn refresh(
    store: &dyn Store,
    tokens: &TokenService,
    refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let claims = tokens.verify_kind(refresh_token, TokenKind::Refresh)?;
    let user = resolve(store, &claims).await?;
    let pair = tokens.issue_pair(&user.email)?;
    log::info!("refreshed tokens for user {}", user.id);
    Ok(pair)
}

/// Resolves the user a verified token speaks for.
///
/// The account may have been deleted since the token was issued; that is
/// reported the same way as a bad token.
pub async fn resolve(store: &dyn Store, claims: &Claims) -> Result<User, AppError> {
    let subject = claims.subject().ok_or_else(invalid_credentials)?;
    store
        .find_user_by_email(subject)
        .await?
        .ok_or_else(invalid_credentials)
}
