//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod brand_repo;
pub mod editor_session_repo;
pub mod product_repo;
pub mod user_repo;

pub use brand_repo::BrandRepo;
pub use editor_session_repo::EditorSessionRepo;
pub use product_repo::ProductRepo;
pub use user_repo::UserRepo;
