use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenKind;
use crate::error::AppError;
use crate::AppState;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 4] = ["/health", "/auth/register", "/auth/login", "/auth/refresh"];

/// Requires a valid access token on every request outside [`PUBLIC_PATHS`].
///
/// The verified [`Claims`](crate::auth::Claims) are stored in the request
/// extensions for [`CurrentUser`](crate::auth::CurrentUser) to pick up.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            let app_err = AppError::Unauthorized("Not authenticated".into());
            return Box::pin(async move { Err(app_err.into()) });
        };

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            let app_err = AppError::InternalServerError("AppState is not registered".into());
            return Box::pin(async move { Err(app_err.into()) });
        };

        let verified = state.tokens.verify_kind(token, TokenKind::Access);
        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("rejected bearer token on {}", req.path());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
