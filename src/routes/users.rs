//! Self-service profile endpoints. Every handler takes the [`AuthUser`]
//! guard, so an absent, malformed, expired, or tampered bearer token is
//! rejected with 401 before the handler body runs.

use rocket::serde::json::Json;
use rocket::{State, delete, get, put};
use rocket_okapi::openapi;

use crate::auth::{AuthState, AuthUser};
use crate::models::{
    ChangePasswordRequest, DeleteAccountRequest, MessageResponse, UpdateProfileRequest, UserView,
};
use crate::routes::helpers::{RouteResult, respond_error};

#[openapi(tag = "Users")]
#[get("/users/me")]
pub async fn get_me(state: &State<AuthState>, user: AuthUser) -> RouteResult<UserView> {
    state
        .accounts
        .get_profile(user.id)
        .await
        .map(Json)
        .map_err(respond_error)
}

#[openapi(tag = "Users")]
#[put("/users/me", data = "<payload>")]
pub async fn update_me(
    state: &State<AuthState>,
    user: AuthUser,
    payload: Json<UpdateProfileRequest>,
) -> RouteResult<UserView> {
    state
        .accounts
        .update_profile(user.id, payload.into_inner())
        .await
        .map(Json)
        .map_err(respond_error)
}

#[openapi(tag = "Users")]
#[put("/users/me/password", data = "<payload>")]
pub async fn change_my_password(
    state: &State<AuthState>,
    user: AuthUser,
    payload: Json<ChangePasswordRequest>,
) -> RouteResult<MessageResponse> {
    state
        .accounts
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await
        .map(|_| Json(MessageResponse::new("password changed")))
        .map_err(respond_error)
}

#[openapi(tag = "Users")]
#[delete("/users/me", data = "<payload>")]
pub async fn delete_me(
    state: &State<AuthState>,
    user: AuthUser,
    payload: Json<DeleteAccountRequest>,
) -> RouteResult<MessageResponse> {
    state
        .accounts
        .delete_self(user.id, &payload.password)
        .await
        .map(|_| Json(MessageResponse::new("account deleted")))
        .map_err(respond_error)
}
