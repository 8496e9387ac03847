use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;

use crate::auth::AuthState;
use crate::auth::responses::{AuthResponse, LoginRequest, RegisterRequest};
use crate::models::MessageResponse;
use crate::routes::helpers::{ErrorBody, RouteResult, respond_error};

/// Create an account and log straight into it: 201 with a bearer token and
/// the public user view. Duplicate username or email is a 409.
#[openapi(tag = "Auth")]
#[post("/auth/register", data = "<payload>")]
pub async fn register(
    state: &State<AuthState>,
    payload: Json<RegisterRequest>,
) -> Result<status::Created<Json<AuthResponse>>, status::Custom<Json<ErrorBody>>> {
    let (token, user) = state
        .accounts
        .register(payload.into_inner())
        .await
        .map_err(respond_error)?;

    let body = AuthResponse {
        token: token.token,
        expires_at: token.expires_at,
        user,
    };
    Ok(status::Created::new("/api/v1/users/me").body(Json(body)))
}

#[openapi(tag = "Auth")]
#[post("/auth/login", data = "<payload>")]
pub async fn login(
    state: &State<AuthState>,
    payload: Json<LoginRequest>,
) -> RouteResult<AuthResponse> {
    let (token, user) = state
        .accounts
        .login(&payload.identifier, &payload.password)
        .await
        .map_err(respond_error)?;

    Ok(Json(AuthResponse {
        token: token.token,
        expires_at: token.expires_at,
        user,
    }))
}

/// Stateless acknowledgment. Tokens are not tracked server-side, so an
/// already-issued token remains valid until its natural expiry; the client is
/// expected to discard it.
#[openapi(tag = "Auth")]
#[post("/auth/logout")]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("logged out"))
}
