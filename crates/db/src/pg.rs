//! [`RecordStore`] backed by the hosted Postgres database.

use async_trait::async_trait;
use stepdish_core::types::RecordId;

use crate::models::comment::{Comment, CreateComment};
use crate::models::profile::{Profile, UpsertProfile};
use crate::models::recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe};
use crate::models::recipe_step::{CreateRecipeStep, RecipeStep};
use crate::repositories::{CommentRepo, ProfileRepo, RecipeRepo, RecipeStepRepo};
use crate::store::{RecordStore, StoreResult};
use crate::DbPool;

/// Delegates every operation to the repositories.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_recipe(&self, input: &CreateRecipe) -> StoreResult<Recipe> {
        Ok(RecipeRepo::create(&self.pool, input).await?)
    }

    async fn find_recipe(&self, id: RecordId) -> StoreResult<Option<Recipe>> {
        Ok(RecipeRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>> {
        Ok(RecipeRepo::list(&self.pool, filter).await?)
    }

    async fn update_recipe(
        &self,
        id: RecordId,
        input: &UpdateRecipe,
    ) -> StoreResult<Option<Recipe>> {
        Ok(RecipeRepo::update(&self.pool, id, input).await?)
    }

    async fn restore_recipe(&self, snapshot: &Recipe) -> StoreResult<Option<Recipe>> {
        Ok(RecipeRepo::restore(&self.pool, snapshot).await?)
    }

    async fn set_recipe_visibility(
        &self,
        id: RecordId,
        is_public: bool,
    ) -> StoreResult<Option<Recipe>> {
        Ok(RecipeRepo::set_visibility(&self.pool, id, is_public).await?)
    }

    async fn delete_recipe(&self, id: RecordId) -> StoreResult<bool> {
        Ok(RecipeRepo::delete(&self.pool, id).await?)
    }

    async fn list_steps(&self, recipe_id: RecordId) -> StoreResult<Vec<RecipeStep>> {
        Ok(RecipeStepRepo::list_by_recipe(&self.pool, recipe_id).await?)
    }

    async fn insert_steps(&self, steps: &[CreateRecipeStep]) -> StoreResult<Vec<RecipeStep>> {
        Ok(RecipeStepRepo::create_many(&self.pool, steps).await?)
    }

    async fn delete_steps(&self, recipe_id: RecordId) -> StoreResult<u64> {
        Ok(RecipeStepRepo::delete_by_recipe(&self.pool, recipe_id).await?)
    }

    async fn list_comments(&self, recipe_id: RecordId) -> StoreResult<Vec<Comment>> {
        Ok(CommentRepo::list_by_recipe(&self.pool, recipe_id).await?)
    }

    async fn find_comment(&self, id: RecordId) -> StoreResult<Option<Comment>> {
        Ok(CommentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn insert_comment(&self, input: &CreateComment) -> StoreResult<Comment> {
        Ok(CommentRepo::create(&self.pool, input).await?)
    }

    async fn delete_comment(&self, id: RecordId) -> StoreResult<bool> {
        Ok(CommentRepo::delete(&self.pool, id).await?)
    }

    async fn delete_comments(&self, recipe_id: RecordId) -> StoreResult<u64> {
        Ok(CommentRepo::delete_by_recipe(&self.pool, recipe_id).await?)
    }

    async fn upsert_profile(&self, input: &UpsertProfile) -> StoreResult<Profile> {
        Ok(ProfileRepo::upsert(&self.pool, input).await?)
    }

    async fn find_profiles(&self, ids: &[RecordId]) -> StoreResult<Vec<Profile>> {
        Ok(ProfileRepo::find_by_ids(&self.pool, ids).await?)
    }
}
