//! The record store boundary.
//!
//! [`RecordStore`] is everything the application needs from the hosted
//! backend's tables: `recipes`, `recipe_steps`, `comments` and
//! `profiles`. No cascade is assumed between tables; deleting a recipe's
//! steps and comments is the caller's job.

use async_trait::async_trait;
use stepdish_core::types::RecordId;

use crate::models::comment::{Comment, CreateComment};
use crate::models::profile::{Profile, UpsertProfile};
use crate::models::recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe};
use crate::models::recipe_step::{CreateRecipeStep, RecipeStep};

/// Failures reported by a [`RecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the embedded migrations failed.
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store could not carry out the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    // ---- recipes ----

    async fn insert_recipe(&self, input: &CreateRecipe) -> StoreResult<Recipe>;

    async fn find_recipe(&self, id: RecordId) -> StoreResult<Option<Recipe>>;

    /// Recipes matching `filter`, newest first.
    async fn list_recipes(&self, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>>;

    /// Replace the editable fields and bump `updated_at`.
    /// Returns `None` if the recipe does not exist.
    async fn update_recipe(
        &self,
        id: RecordId,
        input: &UpdateRecipe,
    ) -> StoreResult<Option<Recipe>>;

    /// Write back a snapshot of a recipe, keeping its `updated_at`.
    /// Returns `None` if the recipe no longer exists.
    async fn restore_recipe(&self, snapshot: &Recipe) -> StoreResult<Option<Recipe>>;

    async fn set_recipe_visibility(
        &self,
        id: RecordId,
        is_public: bool,
    ) -> StoreResult<Option<Recipe>>;

    /// Returns `true` if a row was removed.
    async fn delete_recipe(&self, id: RecordId) -> StoreResult<bool>;

    // ---- recipe steps ----

    /// Steps of a recipe ordered by `step_number`.
    async fn list_steps(&self, recipe_id: RecordId) -> StoreResult<Vec<RecipeStep>>;

    /// Insert all `steps` as one write.
    async fn insert_steps(&self, steps: &[CreateRecipeStep]) -> StoreResult<Vec<RecipeStep>>;

    /// Returns the number of rows removed.
    async fn delete_steps(&self, recipe_id: RecordId) -> StoreResult<u64>;

    // ---- comments ----

    /// Comments of a recipe, oldest first.
    async fn list_comments(&self, recipe_id: RecordId) -> StoreResult<Vec<Comment>>;

    async fn find_comment(&self, id: RecordId) -> StoreResult<Option<Comment>>;

    async fn insert_comment(&self, input: &CreateComment) -> StoreResult<Comment>;

    async fn delete_comment(&self, id: RecordId) -> StoreResult<bool>;

    async fn delete_comments(&self, recipe_id: RecordId) -> StoreResult<u64>;

    // ---- profiles ----

    async fn upsert_profile(&self, input: &UpsertProfile) -> StoreResult<Profile>;

    async fn find_profiles(&self, ids: &[RecordId]) -> StoreResult<Vec<Profile>>;
}
