use axum::extract::FromRequest;

use crate::error::Error;

/// `axum::Json` whose rejections (bad syntax, missing or mistyped fields) answer
/// through the crate error as 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
