//! HTTP route handlers grouped by resource domain.
//!
//! Each submodule corresponds to a logical area of the API (health, user
//! self-service, admin user management) and exposes typed Rocket handlers
//! annotated with `#[openapi]` so `rocket_okapi` can derive an OpenAPI
//! document automatically. The authentication routes themselves live in
//! `crate::auth::routes`, next to the services they orchestrate.

pub mod admin;
pub mod health;
pub mod helpers;
pub mod users;
