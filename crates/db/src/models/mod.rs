//! Record models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the stored row
//! - A create DTO for inserts
//! - An update DTO where the record can change after creation

pub mod comment;
pub mod profile;
pub mod recipe;
pub mod recipe_step;
