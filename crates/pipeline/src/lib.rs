//! Application layer for stepdish: publishing recipes from the step
//! editor, managing and reading them, and comments.
//!
//! Every service is built from an [`AppContext`], which bundles the record
//! store, the blob store and the image normalizer.

pub mod accounts;
pub mod comments;
pub mod config;
pub mod context;
pub mod error;
pub mod publish;
pub mod readers;
pub mod recipes;
pub mod telemetry;

pub use accounts::AccountService;
pub use comments::CommentService;
pub use context::AppContext;
pub use error::{PipelineError, PipelineResult};
pub use publish::{PublishPipeline, RecipeForm};
pub use readers::RecipeReader;
pub use recipes::RecipeService;
