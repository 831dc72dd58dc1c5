//! # taskdeck
//!
//! A small HTTP API for managing task records, protected by bearer-token
//! authentication against an external identity provider.
//!
//! ## Architecture
//!
//! ```text
//!   API layer (axum)  ──▶  auth gate (JWKS / RS256)
//!          │
//!          ▼
//!   TaskService (validation, merge-on-update)
//!          │
//!          ▼
//!   TaskStore (trait) ──▶ sqlite | memory
//! ```
//!
//! ## Modules
//! - `task`: the Task entity and its validation/merge rules
//! - `store`: the persistence contract and its backends
//! - `service`: lifecycle orchestration (create/read/update/delete/list)
//! - `api`: router, handlers, and the bearer-token middleware

pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod task;

pub use config::Config;
pub use error::TaskError;
pub use service::TaskService;
pub use task::{Task, TaskPriority, TaskStatus};
