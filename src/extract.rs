use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections are reported as `{error}` JSON like every
/// other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
