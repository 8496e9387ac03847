//! Admin-only user management. The [`RequireAdmin`] guard layers an exact
//! `admin` role check on top of token verification: a valid non-admin token
//! gets 403, anything less gets 401.

use rocket::serde::json::Json;
use rocket::{State, delete, get, put};
use rocket_okapi::openapi;

use crate::auth::{AuthState, RequireAdmin};
use crate::models::{AdminUpdateRequest, UserStats, UserView};
use crate::routes::helpers::{RouteResult, respond_error};

#[openapi(tag = "Admin")]
#[get("/users")]
pub async fn list_users(state: &State<AuthState>, _admin: RequireAdmin) -> RouteResult<Vec<UserView>> {
    state
        .accounts
        .admin_list()
        .await
        .map(Json)
        .map_err(respond_error)
}

#[openapi(tag = "Admin")]
#[get("/users/<id>")]
pub async fn get_user(
    state: &State<AuthState>,
    _admin: RequireAdmin,
    id: i32,
) -> RouteResult<UserView> {
    state
        .accounts
        .admin_get(id)
        .await
        .map(Json)
        .map_err(respond_error)
}

#[openapi(tag = "Admin")]
#[put("/users/<id>", data = "<payload>")]
pub async fn update_user(
    state: &State<AuthState>,
    _admin: RequireAdmin,
    id: i32,
    payload: Json<AdminUpdateRequest>,
) -> RouteResult<UserView> {
    state
        .accounts
        .admin_update(id, payload.into_inner())
        .await
        .map(Json)
        .map_err(respond_error)
}

/// Deleting your own account through the admin path is refused; use the
/// self-service delete with password confirmation instead.
#[openapi(tag = "Admin")]
#[delete("/users/<id>")]
pub async fn delete_user(
    state: &State<AuthState>,
    admin: RequireAdmin,
    id: i32,
) -> RouteResult<UserView> {
    state
        .accounts
        .admin_delete(admin.0.id, id)
        .await
        .map(Json)
        .map_err(respond_error)
}

#[openapi(tag = "Admin")]
#[get("/stats")]
pub async fn get_stats(state: &State<AuthState>, _admin: RequireAdmin) -> RouteResult<UserStats> {
    state
        .accounts
        .stats()
        .await
        .map(Json)
        .map_err(respond_error)
}
