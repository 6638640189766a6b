use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::services;
use crate::AppState;

/// The user the request's access token speaks for.
///
/// Relies on `AuthMiddleware` having verified the token and stored its claims
/// in the request extensions. The user is then loaded from the store, so a
/// token for an account that no longer exists is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let claims =
                claims.ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered".to_string())
            })?;
            let user = services::auth::resolve(state.store.as_ref(), &claims).await?;
            Ok(CurrentUser(user))
        })
    }
}
