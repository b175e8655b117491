/// Request extractors
///
/// [`JsonBody`] wraps `axum::Json` so that body failures — missing fields,
/// malformed JSON, wrong content type — surface as the same 400 Bad Request
/// every other validation failure uses, instead of axum's default 422.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

/// JSON request body whose rejection maps into [`ApiError`]
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
