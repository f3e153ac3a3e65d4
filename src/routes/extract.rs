//! `Json`, `Query` and `Path` that reject through [`RosterError`], so malformed input gets the same
//! 422 and `{"detail": ..}` body as every other validation failure.

use crate::error::RosterError;
use axum::extract::{FromRequest, FromRequestParts};

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RosterError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RosterError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(RosterError))]
pub struct ApiPath<T>(pub T);
