//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `mailspark_db` or to the engine,
//! and map errors via [`AppError`](crate::error::AppError).

pub mod assets;
pub mod auth;
pub mod billing;
pub mod brands;
pub mod editor;
pub mod generation;
pub mod products;
pub mod upload;
pub mod users;
