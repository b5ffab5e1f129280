use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AccountError;

/// `Json<T>` whose rejection is a validation error with a fixed message.
pub struct AccountJson<T>(pub T);

/// `Path<T>` whose rejection is a validation error with a fixed message.
pub struct AccountPath<T>(pub T);

impl From<JsonRejection> for AccountError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "request body rejected");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AccountError::validation("Expected Content-Type: application/json")
            }
            JsonRejection::JsonSyntaxError(_) => AccountError::validation("Malformed JSON body"),
            _ => AccountError::validation("Invalid request body"),
        }
    }
}

impl From<PathRejection> for AccountError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "path parameter rejected");
        AccountError::validation("Invalid user id")
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for AccountJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AccountJson(value))
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for AccountPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(AccountPath(value))
    }
}
