//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod profile_repo;
pub mod recipe_repo;
pub mod recipe_step_repo;

pub use comment_repo::CommentRepo;
pub use profile_repo::ProfileRepo;
pub use recipe_repo::RecipeRepo;
pub use recipe_step_repo::RecipeStepRepo;
