//! Read-only views: the public feed and a recipe's detail page.

use std::collections::HashMap;

use serde::Serialize;
use stepdish_core::error::CoreError;
use stepdish_core::session::SessionContext;
use stepdish_core::types::RecordId;
use stepdish_db::models::profile::ProfileSummary;
use stepdish_db::models::recipe::{Recipe, RecipeFilter};
use stepdish_db::models::recipe_step::RecipeStep;
use stepdish_db::{RecordStore, StoreResult};

use crate::context::AppContext;
use crate::error::PipelineResult;

/// A recipe as shown in the feed grid.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCard {
    pub recipe: Recipe,
    /// `None` when the author never completed sign-up.
    pub author: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub author: Option<ProfileSummary>,
    /// Ordered by `step_number`.
    pub steps: Vec<RecipeStep>,
}

#[derive(Clone)]
pub struct RecipeReader {
    ctx: AppContext,
}

impl RecipeReader {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Published recipes, newest first, optionally narrowed by title.
    pub async fn feed(&self, search: Option<&str>) -> PipelineResult<Vec<RecipeCard>> {
        let recipes = self
            .ctx
            .records
            .list_recipes(&RecipeFilter::feed(search))
            .await?;

        let author_ids: Vec<RecordId> = recipes.iter().map(|r| r.author_id).collect();
        let authors = profile_summaries(self.ctx.records.as_ref(), &author_ids).await?;

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeCard {
                author: authors.get(&recipe.author_id).cloned(),
                recipe,
            })
            .collect())
    }

    /// A recipe with its author and steps.
    ///
    /// Drafts and private recipes are only visible to their author; anyone
    /// else gets `NotFound`.
    pub async fn detail(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
    ) -> PipelineResult<RecipeDetail> {
        let recipe = visible_recipe(self.ctx.records.as_ref(), session, recipe_id).await?;

        let author_ids = [recipe.author_id];
        let (steps, authors) = tokio::try_join!(
            self.ctx.records.list_steps(recipe_id),
            profile_summaries(self.ctx.records.as_ref(), &author_ids),
        )?;

        Ok(RecipeDetail {
            author: authors.get(&recipe.author_id).cloned(),
            recipe,
            steps,
        })
    }
}

/// Fetch a recipe the viewer is allowed to see.
///
/// Drafts and private recipes exist only for their author; for anyone else
/// they are `NotFound`, same as a missing id.
pub(crate) async fn visible_recipe(
    records: &dyn RecordStore,
    session: &SessionContext,
    recipe_id: RecordId,
) -> PipelineResult<Recipe> {
    let not_found = || CoreError::NotFound {
        entity: "Recipe",
        id: recipe_id,
    };

    let recipe = records.find_recipe(recipe_id).await?.ok_or_else(not_found)?;

    let is_author = session
        .current()
        .is_some_and(|user| user.id == recipe.author_id);
    if !recipe.is_published() && !is_author {
        return Err(not_found().into());
    }
    Ok(recipe)
}

/// Look up the profile summaries of `ids`, skipping duplicates.
pub(crate) async fn profile_summaries(
    records: &dyn RecordStore,
    ids: &[RecordId],
) -> StoreResult<HashMap<RecordId, ProfileSummary>> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = records.find_profiles(&unique).await?;
    Ok(profiles
        .iter()
        .map(|p| (p.id, ProfileSummary::from(p)))
        .collect())
}
