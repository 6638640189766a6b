use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A JSON request body whose errors name the offending field.
///
/// The payload is read as untyped JSON first (content type, size limit and
/// syntax are checked by `web::Json` and its `JsonConfig`), then converted to
/// `T` while tracking the path, so a bad value in `status` is reported as
/// `body.status`.
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for JsonBody<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let raw = web::Json::<serde_json::Value>::from_request(req, payload);

        Box::pin(async move {
            let value = raw.await?.into_inner();
            let body = serde_path_to_error::deserialize(value).map_err(AppError::from)?;
            Ok(JsonBody(body))
        })
    }
}
