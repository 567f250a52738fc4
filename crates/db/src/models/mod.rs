//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row, a `Deserialize` create DTO and an update DTO with all-`Option` fields.

pub mod brand;
pub mod editor_session;
pub mod product;
pub mod user;
