//! Shared response plumbing for the route handlers: the JSON error body and
//! the mapping from domain errors to HTTP statuses.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

pub type RouteResult<T> = Result<Json<T>, status::Custom<Json<ErrorBody>>>;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

/// Map a domain error to its response. 500-class causes are logged and
/// replaced with a generic message so storage and hashing detail never
/// reaches the caller.
pub fn respond_error(err: AuthError) -> status::Custom<Json<ErrorBody>> {
    let status = err.status();
    let message = if status == Status::InternalServerError {
        log::error!("internal error: {err}");
        "internal server error".to_string()
    } else {
        err.to_string()
    };
    status::Custom(
        status,
        Json(ErrorBody {
            status: status.code,
            message,
        }),
    )
}
