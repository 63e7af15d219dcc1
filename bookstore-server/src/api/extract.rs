//! JSON body extractor reporting rejections through the error envelope

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};

/// Like [`axum::Json`], but a malformed body answers with an [`AppError`].
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let code = match &rejection {
        // Well-formed JSON of the wrong shape
        JsonRejection::JsonDataError(_) => ErrorCode::ValidationFailed,
        _ => ErrorCode::InvalidFormat,
    };
    AppError::with_message(code, rejection.body_text())
}
