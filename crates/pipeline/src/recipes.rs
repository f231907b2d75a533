//! Managing one's own recipes: listing, visibility, deletion and loading
//! a recipe back into the step editor.

use stepdish_core::error::CoreError;
use stepdish_core::recipe::SaveMode;
use stepdish_core::session::{ensure_author, AuthUser, SessionContext};
use stepdish_core::step_list::{Step, StepList};
use stepdish_core::types::RecordId;
use stepdish_db::models::recipe::{Recipe, RecipeFilter};

use crate::context::AppContext;
use crate::error::PipelineResult;
use crate::publish::RecipeForm;

/// Everything the editor needs to resume editing a saved recipe.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub recipe: Recipe,
    pub form: RecipeForm,
    /// Seeded from the persisted steps in sequence order.
    pub steps: StepList,
    pub mode: SaveMode,
}

#[derive(Clone)]
pub struct RecipeService {
    ctx: AppContext,
}

impl RecipeService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// The signed-in user's recipes, drafts and private ones included.
    pub async fn my_recipes(&self, session: &SessionContext) -> PipelineResult<Vec<Recipe>> {
        let user = session.require_user()?;
        let recipes = self
            .ctx
            .records
            .list_recipes(&RecipeFilter::by_author(user.id))
            .await?;
        Ok(recipes)
    }

    pub async fn set_visibility(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
        is_public: bool,
    ) -> PipelineResult<Recipe> {
        let user = session.require_user()?;
        self.owned(&user, recipe_id).await?;
        self.write_visibility(recipe_id, is_public).await
    }

    /// Flip between public and private.
    pub async fn toggle_visibility(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
    ) -> PipelineResult<Recipe> {
        let user = session.require_user()?;
        let current = self.owned(&user, recipe_id).await?;
        self.write_visibility(recipe_id, !current.is_public).await
    }

    /// Delete a recipe with its steps and comments. Author only.
    ///
    /// The store does not cascade, so the three deletes are issued in turn:
    /// steps, comments, then the recipe itself.
    pub async fn delete(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
    ) -> PipelineResult<()> {
        let user = session.require_user()?;
        self.owned(&user, recipe_id).await?;

        let steps = self.ctx.records.delete_steps(recipe_id).await?;
        let comments = self.ctx.records.delete_comments(recipe_id).await?;
        if !self.ctx.records.delete_recipe(recipe_id).await? {
            return Err(CoreError::NotFound {
                entity: "Recipe",
                id: recipe_id,
            }
            .into());
        }

        tracing::info!(recipe_id = %recipe_id, steps, comments, "Recipe deleted");
        Ok(())
    }

    /// Load a recipe into an editing session. Author only.
    pub async fn load_for_edit(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
    ) -> PipelineResult<EditSession> {
        let user = session.require_user()?;
        let recipe = self.owned(&user, recipe_id).await?;
        let records = self.ctx.records.list_steps(recipe_id).await?;

        let steps = StepList::from_steps(
            records
                .into_iter()
                .map(|r| Step::existing(r.id, r.image_url, r.description))
                .collect(),
        );
        let mode = if recipe.is_draft {
            SaveMode::Draft
        } else {
            SaveMode::Publish
        };

        Ok(EditSession {
            form: RecipeForm::from(&recipe),
            recipe,
            steps,
            mode,
        })
    }

    async fn write_visibility(
        &self,
        recipe_id: RecordId,
        is_public: bool,
    ) -> PipelineResult<Recipe> {
        let recipe = self
            .ctx
            .records
            .set_recipe_visibility(recipe_id, is_public)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Recipe",
                id: recipe_id,
            })?;
        tracing::info!(recipe_id = %recipe_id, is_public, "Recipe visibility changed");
        Ok(recipe)
    }

    /// Fetch `recipe_id` and check `user` wrote it.
    async fn owned(&self, user: &AuthUser, recipe_id: RecordId) -> PipelineResult<Recipe> {
        let recipe = self
            .ctx
            .records
            .find_recipe(recipe_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Recipe",
                id: recipe_id,
            })?;
        ensure_author(user, recipe.author_id)?;
        Ok(recipe)
    }
}
