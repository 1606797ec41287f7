//! Request body extraction.
//!
//! Clients expect every malformed request to answer 400 with a readable
//! message. axum's `Json` rejects with 400, 415 or 422 depending on the
//! failure, so handlers take [`AppJson`] instead.
//!
//! ```ignore
//! async fn my_handler(AppJson(payload): AppJson<StagePayload>) -> ... {
//!     // payload parsed; field validation is still the handler's job
//! }
//! ```

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body whose rejections are [`AppError::Validation`].
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        Ok(AppJson(value))
    }
}
