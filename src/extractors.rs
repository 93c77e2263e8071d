use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejection renders as the usual `AppError` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
