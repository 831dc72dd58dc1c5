//! HTTP API for task records.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check (public)
//! - `GET /tasks` - List all tasks
//! - `POST /tasks` - Create a task
//! - `GET /tasks/{id}` - Get a task
//! - `PUT /tasks/{id}` - Partially update a task (merge semantics)
//! - `DELETE /tasks/{id}` - Delete a task
//! - `GET /users/me` - The authenticated principal's username
//!
//! All `/tasks` and `/users` routes require `Authorization: Bearer <token>`, verified
//! against the identity provider's signing keys.

mod auth;
mod routes;
pub mod types;

pub use auth::AuthUser;
pub use routes::serve;
