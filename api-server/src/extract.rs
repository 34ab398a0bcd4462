//! Request extractors whose rejections render as `AppError`

use axum::extract::FromRequest;

use crate::AppError;

/// `axum::Json` with malformed or oversized bodies mapped to `AppError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
