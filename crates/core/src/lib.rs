//! Domain core for stepdish: step editing, image normalization, upload
//! naming, recipe field rules and the signed-in session.

pub mod error;
pub mod image;
pub mod naming;
pub mod recipe;
pub mod session;
pub mod step_list;
pub mod types;
