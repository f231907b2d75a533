//! Turning an edited [`StepList`] plus recipe metadata into records.
//!
//! Both flows run the same way:
//!
//! 1. Validate the form locally (title, photo requirement).
//! 2. Normalize and upload every newly attached photo concurrently.
//! 3. Keep only steps with an image URL and number them from 1.
//! 4. Write the recipe, then its step records.
//!
//! Writes after the upload batch are compensated in reverse order when a
//! later write fails, so a failed save leaves the previous state behind.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use stepdish_core::error::CoreError;
use stepdish_core::naming;
use stepdish_core::recipe::{self, SaveMode};
use stepdish_core::session::{ensure_author, SessionContext};
use stepdish_core::step_list::{Step, StepList};
use stepdish_core::types::RecordId;
use stepdish_db::models::recipe::{CreateRecipe, Recipe, UpdateRecipe};
use stepdish_db::models::recipe_step::CreateRecipeStep;

use crate::context::AppContext;
use crate::error::{PipelineError, PipelineResult};

/// Recipe metadata edited alongside the steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            is_public: true,
        }
    }
}

impl From<&Recipe> for RecipeForm {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone().unwrap_or_default(),
            is_public: recipe.is_public,
        }
    }
}

/// A valid step ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStep {
    /// 1-based position among the valid steps.
    pub step_number: i32,
    pub image_url: String,
    pub description: Option<String>,
}

/// Outcome of the upload batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSteps {
    pub steps: Vec<ResolvedStep>,
    /// Storage paths uploaded by this batch.
    pub uploaded_paths: Vec<String>,
}

impl ResolvedSteps {
    pub fn cover_image(&self) -> Option<&str> {
        cover_image(&self.steps)
    }

    fn records(&self, recipe_id: RecordId) -> Vec<CreateRecipeStep> {
        self.steps
            .iter()
            .map(|step| CreateRecipeStep {
                recipe_id,
                step_number: step.step_number,
                image_url: step.image_url.clone(),
                description: step.description.clone(),
            })
            .collect()
    }
}

/// The image URL of the first valid step.
pub fn cover_image(steps: &[ResolvedStep]) -> Option<&str> {
    steps.first().map(|step| step.image_url.as_str())
}

/// Where one step's image URL came from.
enum StepImage {
    Uploaded { path: String, url: String },
    Existing(String),
    Missing,
}

impl StepImage {
    fn url(&self) -> Option<&str> {
        match self {
            StepImage::Uploaded { url, .. } => Some(url),
            StepImage::Existing(url) => Some(url),
            StepImage::Missing => None,
        }
    }
}

/// Saves recipes from the step editor.
#[derive(Clone)]
pub struct PublishPipeline {
    ctx: AppContext,
}

impl PublishPipeline {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Create a new recipe owned by the signed-in user.
    pub async fn create(
        &self,
        session: &SessionContext,
        form: &RecipeForm,
        steps: &StepList,
        mode: SaveMode,
    ) -> PipelineResult<Recipe> {
        let user = session.require_user()?;
        let (title, description) = validate(form, steps, mode)?;
        tracing::info!(
            author_id = %user.id,
            steps = steps.len(),
            ?mode,
            "Publishing new recipe",
        );

        let resolved = self.resolve_steps(steps).await?;
        let mut rollback = Rollback::new(&self.ctx);
        rollback.push(Undo::RemoveUploads(resolved.uploaded_paths.clone()));

        let input = CreateRecipe {
            author_id: user.id,
            title,
            description,
            is_public: form.is_public,
            is_draft: mode.is_draft(),
            cover_image_url: resolved.cover_image().map(str::to_string),
        };

        let recipe = match self.ctx.records.insert_recipe(&input).await {
            Ok(recipe) => recipe,
            Err(e) => return Err(rollback.fail(e.into()).await),
        };
        rollback.push(Undo::DeleteRecipe(recipe.id));

        let records = resolved.records(recipe.id);
        if !records.is_empty() {
            if let Err(e) = self.ctx.records.insert_steps(&records).await {
                return Err(rollback.fail(e.into()).await);
            }
        }

        tracing::info!(
            recipe_id = %recipe.id,
            author_id = %user.id,
            steps = records.len(),
            draft = recipe.is_draft,
            "Recipe created",
        );
        Ok(recipe)
    }

    /// Replace an existing recipe's fields and steps. Author only.
    pub async fn update(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
        form: &RecipeForm,
        steps: &StepList,
        mode: SaveMode,
    ) -> PipelineResult<Recipe> {
        let user = session.require_user()?;
        let (title, description) = validate(form, steps, mode)?;

        let previous = self
            .ctx
            .records
            .find_recipe(recipe_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Recipe",
                id: recipe_id,
            })?;
        ensure_author(&user, previous.author_id)?;
        tracing::info!(
            recipe_id = %recipe_id,
            steps = steps.len(),
            ?mode,
            "Publishing recipe update",
        );
        let previous_steps = self.ctx.records.list_steps(recipe_id).await?;

        let resolved = self.resolve_steps(steps).await?;
        let mut rollback = Rollback::new(&self.ctx);
        rollback.push(Undo::RemoveUploads(resolved.uploaded_paths.clone()));

        let input = UpdateRecipe {
            title,
            description,
            is_public: form.is_public,
            is_draft: mode.is_draft(),
            cover_image_url: resolved.cover_image().map(str::to_string),
        };

        let recipe = match self.ctx.records.update_recipe(recipe_id, &input).await {
            Ok(Some(recipe)) => recipe,
            Ok(None) => {
                let err = CoreError::NotFound {
                    entity: "Recipe",
                    id: recipe_id,
                };
                return Err(rollback.fail(err.into()).await);
            }
            Err(e) => return Err(rollback.fail(e.into()).await),
        };
        rollback.push(Undo::RestoreRecipe(previous));

        if let Err(e) = self.ctx.records.delete_steps(recipe_id).await {
            return Err(rollback.fail(e.into()).await);
        }
        rollback.push(Undo::RestoreSteps {
            recipe_id,
            previous: previous_steps.iter().map(CreateRecipeStep::from).collect(),
        });

        let records = resolved.records(recipe_id);
        if !records.is_empty() {
            if let Err(e) = self.ctx.records.insert_steps(&records).await {
                return Err(rollback.fail(e.into()).await);
            }
        }

        tracing::info!(
            recipe_id = %recipe.id,
            steps = records.len(),
            replaced = previous_steps.len(),
            draft = recipe.is_draft,
            "Recipe updated",
        );
        Ok(recipe)
    }

    /// Normalize and upload every newly attached photo, all at once.
    ///
    /// If any step fails, the uploads that did succeed are removed again
    /// and the first failure in list order is returned.
    pub async fn resolve_steps(&self, steps: &StepList) -> PipelineResult<ResolvedSteps> {
        let results = join_all(steps.iter().map(|step| self.resolve_image(step))).await;

        let uploaded_paths: Vec<String> = results
            .iter()
            .filter_map(|result| match result {
                Ok(StepImage::Uploaded { path, .. }) => Some(path.clone()),
                _ => None,
            })
            .collect();

        let mut images = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(image) => images.push(image),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        if let Some(err) = failure {
            tracing::warn!(
                error = %err,
                uploaded = uploaded_paths.len(),
                "Step image batch failed",
            );
            self.remove_uploads(&uploaded_paths).await;
            return Err(err);
        }

        let resolved = steps
            .iter()
            .zip(&images)
            .filter_map(|(step, image)| {
                let description = recipe::normalize_optional_text(&step.description);
                image.url().map(|url| (url.to_string(), description))
            })
            .enumerate()
            .map(|(index, (image_url, description))| ResolvedStep {
                step_number: index as i32 + 1,
                image_url,
                description,
            })
            .collect();

        Ok(ResolvedSteps {
            steps: resolved,
            uploaded_paths,
        })
    }

    async fn resolve_image(&self, step: &Step) -> PipelineResult<StepImage> {
        let Some(raw) = &step.image else {
            return Ok(match step.stored_url() {
                Some(url) => StepImage::Existing(url.to_string()),
                None => StepImage::Missing,
            });
        };

        let normalized = self.ctx.normalizer.normalize(raw).await?;
        let path = naming::new_upload_path();
        let size = normalized.bytes.len();
        let content_type = normalized.content_type();

        self.ctx
            .blobs
            .upload(&self.ctx.bucket, &path, normalized.bytes, content_type)
            .await?;
        let url = self.ctx.blobs.public_url(&self.ctx.bucket, &path);

        tracing::debug!(step_id = %step.id, path = %path, size, "Step image uploaded");
        Ok(StepImage::Uploaded { path, url })
    }

    async fn remove_uploads(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        if let Err(e) = self.ctx.blobs.remove(&self.ctx.bucket, paths).await {
            tracing::error!(error = %e, count = paths.len(), "Failed to remove orphaned uploads");
        }
    }
}

/// Local checks that run before any network call.
fn validate(
    form: &RecipeForm,
    steps: &StepList,
    mode: SaveMode,
) -> Result<(String, Option<String>), CoreError> {
    let title = recipe::normalize_title(&form.title)?;
    recipe::require_photo(mode, steps.has_image_step())?;
    Ok((title, recipe::normalize_optional_text(&form.description)))
}

// ---------------------------------------------------------------------------
// Compensation
// ---------------------------------------------------------------------------

/// Reverses one completed write.
#[derive(Debug)]
enum Undo {
    RemoveUploads(Vec<String>),
    DeleteRecipe(RecordId),
    /// Holds the row as read before the update, `updated_at` included.
    RestoreRecipe(Recipe),
    RestoreSteps {
        recipe_id: RecordId,
        previous: Vec<CreateRecipeStep>,
    },
}

/// Completed writes of one save, undone newest first on failure.
struct Rollback<'a> {
    ctx: &'a AppContext,
    undo: Vec<Undo>,
}

impl<'a> Rollback<'a> {
    fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            undo: Vec::new(),
        }
    }

    fn push(&mut self, undo: Undo) {
        self.undo.push(undo);
    }

    /// Undo everything recorded so far and hand back `err`.
    ///
    /// Undo failures are logged; the original error is always returned.
    async fn fail(self, err: PipelineError) -> PipelineError {
        tracing::warn!(error = %err, pending = self.undo.len(), "Save failed, rolling back");
        for undo in self.undo.into_iter().rev() {
            if let Err(e) = apply(self.ctx, &undo).await {
                tracing::error!(error = %e, undo = ?undo, "Rollback step failed");
            }
        }
        err
    }
}

async fn apply(ctx: &AppContext, undo: &Undo) -> PipelineResult<()> {
    match undo {
        Undo::RemoveUploads(paths) => {
            if !paths.is_empty() {
                ctx.blobs.remove(&ctx.bucket, paths).await?;
            }
        }
        Undo::DeleteRecipe(id) => {
            ctx.records.delete_recipe(*id).await?;
        }
        Undo::RestoreRecipe(previous) => {
            ctx.records.restore_recipe(previous).await?;
        }
        Undo::RestoreSteps {
            recipe_id,
            previous,
        } => {
            ctx.records.delete_steps(*recipe_id).await?;
            if !previous.is_empty() {
                ctx.records.insert_steps(previous).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: i32, url: &str) -> ResolvedStep {
        ResolvedStep {
            step_number: n,
            image_url: url.to_string(),
            description: None,
        }
    }

    #[test]
    fn cover_is_first_step() {
        let steps = vec![step(1, "a"), step(2, "b")];
        assert_eq!(cover_image(&steps), Some("a"));
    }

    #[test]
    fn no_steps_no_cover() {
        assert_eq!(cover_image(&[]), None);
    }

    #[test]
    fn blank_title_fails_before_photo_check() {
        let form = RecipeForm {
            title: "   ".into(),
            ..RecipeForm::default()
        };
        let err = validate(&form, &StepList::with_blank_step(), SaveMode::Publish).unwrap_err();
        assert_eq!(err.to_string(), format!("Validation failed: {}", recipe::TITLE_REQUIRED));
    }

    #[test]
    fn draft_without_photos_is_valid() {
        let form = RecipeForm {
            title: " Soup ".into(),
            description: "  ".into(),
            ..RecipeForm::default()
        };
        let (title, description) =
            validate(&form, &StepList::with_blank_step(), SaveMode::Draft).unwrap();
        assert_eq!(title, "Soup");
        assert_eq!(description, None);
    }

    #[test]
    fn form_defaults_to_public() {
        let form: RecipeForm = serde_json::from_str(r#"{"title":"Tea"}"#).unwrap();
        assert!(form.is_public);
        assert!(form.description.is_empty());
    }

    #[test]
    fn records_carry_recipe_id() {
        let resolved = ResolvedSteps {
            steps: vec![step(1, "a")],
            uploaded_paths: vec![],
        };
        let id = uuid::Uuid::new_v4();
        let records = resolved.records(id);
        assert_eq!(records[0].recipe_id, id);
        assert_eq!(records[0].step_number, 1);
    }
}
