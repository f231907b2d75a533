//! In-process [`RecordStore`] for tests and local tooling.
//!
//! Behaves like the Postgres store (ordering, no cascades, `updated_at`
//! bumps) and records every write it performs. Writes can be made to fail
//! on demand to exercise error paths.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use stepdish_core::types::RecordId;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::comment::{Comment, CreateComment};
use crate::models::profile::{Profile, UpsertProfile};
use crate::models::recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe};
use crate::models::recipe_step::{CreateRecipeStep, RecipeStep};
use crate::store::{RecordStore, StoreError, StoreResult};

/// Write operations, used for failure injection and the write log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertRecipe,
    UpdateRecipe,
    RestoreRecipe,
    SetVisibility,
    DeleteRecipe,
    InsertSteps,
    DeleteSteps,
    InsertComment,
    DeleteComment,
    DeleteComments,
    UpsertProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailMode {
    Once,
    Always,
}

#[derive(Debug, Default)]
struct Tables {
    /// Insertion order is kept so equal timestamps still sort stably.
    recipes: Vec<Recipe>,
    steps: Vec<RecipeStep>,
    comments: Vec<Comment>,
    profiles: HashMap<RecordId, Profile>,
    failures: HashMap<StoreOp, FailMode>,
    writes: Vec<StoreOp>,
}

impl Tables {
    /// Consume an injected failure for `op`, or log the write.
    fn begin_write(&mut self, op: StoreOp) -> StoreResult<()> {
        match self.failures.get(&op).copied() {
            Some(mode) => {
                if mode == FailMode::Once {
                    self.failures.remove(&op);
                }
                Err(StoreError::Unavailable(format!("{op:?} failed")))
            }
            None => {
                self.writes.push(op);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `op` fail.
    pub async fn fail_once(&self, op: StoreOp) {
        self.tables.write().await.failures.insert(op, FailMode::Once);
    }

    /// Make every `op` fail until [`clear_failures`](Self::clear_failures).
    pub async fn fail_always(&self, op: StoreOp) {
        self.tables.write().await.failures.insert(op, FailMode::Always);
    }

    pub async fn clear_failures(&self) {
        self.tables.write().await.failures.clear();
    }

    /// Successful writes so far, in order.
    pub async fn writes(&self) -> Vec<StoreOp> {
        self.tables.read().await.writes.clone()
    }

    /// Every stored step, regardless of recipe.
    pub async fn all_steps(&self) -> Vec<RecipeStep> {
        self.tables.read().await.steps.clone()
    }

    pub async fn recipe_count(&self) -> usize {
        self.tables.read().await.recipes.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_recipe(&self, input: &CreateRecipe) -> StoreResult<Recipe> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::InsertRecipe)?;

        let now = Utc::now();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            author_id: input.author_id,
            title: input.title.clone(),
            description: input.description.clone(),
            is_public: input.is_public,
            is_draft: input.is_draft,
            cover_image_url: input.cover_image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn find_recipe(&self, id: RecordId) -> StoreResult<Option<Recipe>> {
        let tables = self.tables.read().await;
        Ok(tables.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>> {
        let tables = self.tables.read().await;
        // Newest insert first, then a stable sort so timestamp ties keep it.
        let mut out: Vec<Recipe> = tables
            .recipes
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn update_recipe(
        &self,
        id: RecordId,
        input: &UpdateRecipe,
    ) -> StoreResult<Option<Recipe>> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::UpdateRecipe)?;

        let Some(recipe) = tables.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        recipe.title = input.title.clone();
        recipe.description = input.description.clone();
        recipe.is_public = input.is_public;
        recipe.is_draft = input.is_draft;
        recipe.cover_image_url = input.cover_image_url.clone();
        recipe.updated_at = Utc::now();
        Ok(Some(recipe.clone()))
    }

    async fn restore_recipe(&self, snapshot: &Recipe) -> StoreResult<Option<Recipe>> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::RestoreRecipe)?;

        let Some(recipe) = tables.recipes.iter_mut().find(|r| r.id == snapshot.id) else {
            return Ok(None);
        };
        let created_at = recipe.created_at;
        *recipe = Recipe {
            created_at,
            ..snapshot.clone()
        };
        Ok(Some(recipe.clone()))
    }

    async fn set_recipe_visibility(
        &self,
        id: RecordId,
        is_public: bool,
    ) -> StoreResult<Option<Recipe>> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::SetVisibility)?;

        let Some(recipe) = tables.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        recipe.is_public = is_public;
        recipe.updated_at = Utc::now();
        Ok(Some(recipe.clone()))
    }

    async fn delete_recipe(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::DeleteRecipe)?;

        let before = tables.recipes.len();
        tables.recipes.retain(|r| r.id != id);
        Ok(tables.recipes.len() < before)
    }

    async fn list_steps(&self, recipe_id: RecordId) -> StoreResult<Vec<RecipeStep>> {
        let tables = self.tables.read().await;
        let mut out: Vec<RecipeStep> = tables
            .steps
            .iter()
            .filter(|s| s.recipe_id == recipe_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.step_number);
        Ok(out)
    }

    async fn insert_steps(&self, steps: &[CreateRecipeStep]) -> StoreResult<Vec<RecipeStep>> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::InsertSteps)?;

        let now = Utc::now();
        let rows: Vec<RecipeStep> = steps
            .iter()
            .map(|s| RecipeStep {
                id: Uuid::new_v4(),
                recipe_id: s.recipe_id,
                step_number: s.step_number,
                image_url: s.image_url.clone(),
                description: s.description.clone(),
                created_at: now,
            })
            .collect();
        tables.steps.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn delete_steps(&self, recipe_id: RecordId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::DeleteSteps)?;

        let before = tables.steps.len();
        tables.steps.retain(|s| s.recipe_id != recipe_id);
        Ok((before - tables.steps.len()) as u64)
    }

    async fn list_comments(&self, recipe_id: RecordId) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut out: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.recipe_id == recipe_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    async fn find_comment(&self, id: RecordId) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_comment(&self, input: &CreateComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::InsertComment)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            recipe_id: input.recipe_id,
            author_id: input.author_id,
            content: input.content.clone(),
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::DeleteComment)?;

        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }

    async fn delete_comments(&self, recipe_id: RecordId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::DeleteComments)?;

        let before = tables.comments.len();
        tables.comments.retain(|c| c.recipe_id != recipe_id);
        Ok((before - tables.comments.len()) as u64)
    }

    async fn upsert_profile(&self, input: &UpsertProfile) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;
        tables.begin_write(StoreOp::UpsertProfile)?;

        let created_at = tables
            .profiles
            .get(&input.id)
            .map(|p| p.created_at)
            .unwrap_or_else(Utc::now);
        let profile = Profile {
            id: input.id,
            display_name: input.display_name.clone(),
            avatar_url: input.avatar_url.clone(),
            created_at,
        };
        tables.profiles.insert(input.id, profile.clone());
        Ok(profile)
    }

    async fn find_profiles(&self, ids: &[RecordId]) -> StoreResult<Vec<Profile>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }
}
