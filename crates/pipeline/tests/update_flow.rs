//! Editing saved recipes: seeding the editor, replacing steps, and
//! restoring the previous state when a write fails.

mod common;

use assert_matches::assert_matches;
use common::{editor, form, new_user, png, Harness};
use stepdish_core::error::CoreError;
use stepdish_core::recipe::SaveMode;
use stepdish_core::session::SessionContext;
use stepdish_core::step_list::StepPatch;
use stepdish_db::memory::StoreOp;
use stepdish_db::models::recipe::Recipe;
use stepdish_db::RecordStore;
use stepdish_pipeline::{PipelineError, RecipeService};

/// Publish a two-step recipe and return it.
async fn published(h: &Harness) -> Recipe {
    let steps = editor(vec![(Some(png(20, 10)), "mix"), (Some(png(10, 20)), "bake")]);
    let mut recipe_form = form("Bread");
    recipe_form.description = "crusty".into();
    h.pipeline()
        .create(&h.session, &recipe_form, &steps, SaveMode::Publish)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_session_is_seeded_from_stored_steps() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let stored = h.records.list_steps(recipe.id).await.unwrap();

    let edit = RecipeService::new(h.ctx.clone())
        .load_for_edit(&h.session, recipe.id)
        .await
        .unwrap();

    assert_eq!(edit.form.title, "Bread");
    assert_eq!(edit.form.description, "crusty");
    assert_eq!(edit.mode, SaveMode::Publish);
    assert_eq!(edit.steps.len(), 2);
    for (step, record) in edit.steps.iter().zip(&stored) {
        assert_eq!(step.id, record.id);
        assert_eq!(step.stored_url(), Some(record.image_url.as_str()));
        assert!(step.image.is_none());
    }
    assert_eq!(edit.steps.get(1).unwrap().description, "bake");
}

#[tokio::test]
async fn draft_without_steps_seeds_one_blank_step() {
    let h = Harness::new();
    let recipe = h
        .pipeline()
        .create(&h.session, &form("Idea"), &editor(vec![]), SaveMode::Draft)
        .await
        .unwrap();

    let edit = RecipeService::new(h.ctx.clone())
        .load_for_edit(&h.session, recipe.id)
        .await
        .unwrap();

    assert_eq!(edit.mode, SaveMode::Draft);
    assert_eq!(edit.steps.len(), 1);
    assert!(!edit.steps.get(0).unwrap().has_image());
}

#[tokio::test]
async fn only_author_can_load_for_edit() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let stranger = SessionContext::signed_in(new_user("other@example.com"));

    let err = RecipeService::new(h.ctx.clone())
        .load_for_edit(&stranger, recipe.id)
        .await
        .unwrap_err();
    assert_matches!(err, PipelineError::Core(CoreError::Forbidden(_)));
}

// ---------------------------------------------------------------------------
// Replacing steps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_replaces_every_step() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let old = h.records.list_steps(recipe.id).await.unwrap();

    let mut edit = RecipeService::new(h.ctx.clone())
        .load_for_edit(&h.session, recipe.id)
        .await
        .unwrap();
    // Drop "mix", keep "bake" with its stored photo, add a new first step.
    edit.steps.remove(0);
    edit.steps.insert();
    edit.steps.update(1, StepPatch::image(png(40, 40)));
    edit.steps.update(1, StepPatch::description("prep"));
    edit.steps.reorder(1, 0);
    edit.steps.insert();
    edit.form.title = "Better Bread".into();

    let updated = h
        .pipeline()
        .update(&h.session, recipe.id, &edit.form, &edit.steps, SaveMode::Publish)
        .await
        .unwrap();

    let steps = h.records.list_steps(recipe.id).await.unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].step_number, 1);
    assert_eq!(steps[0].description.as_deref(), Some("prep"));
    assert_eq!(h.stored_dimensions(&steps[0].image_url).await, (40, 40));
    assert_eq!(steps[1].step_number, 2);
    assert_eq!(steps[1].image_url, old[1].image_url);
    assert_eq!(steps[1].description.as_deref(), Some("bake"));
    assert!(steps.iter().all(|s| old.iter().all(|o| o.id != s.id)));

    assert_eq!(updated.title, "Better Bread");
    assert_eq!(updated.cover_image_url.as_deref(), Some(steps[0].image_url.as_str()));
    assert_eq!(h.records.all_steps().await.len(), 2);
}

#[tokio::test]
async fn saving_as_draft_clears_cover_when_no_photos_remain() {
    let h = Harness::new();
    let recipe = published(&h).await;

    let updated = h
        .pipeline()
        .update(
            &h.session,
            recipe.id,
            &form("Bread"),
            &editor(vec![(None, "later")]),
            SaveMode::Draft,
        )
        .await
        .unwrap();

    assert!(updated.is_draft);
    assert_eq!(updated.cover_image_url, None);
    assert!(h.records.list_steps(recipe.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_author_can_update() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let stranger = SessionContext::signed_in(new_user("other@example.com"));
    let uploads_before = h.stored_paths().await;

    let err = h
        .pipeline()
        .update(
            &stranger,
            recipe.id,
            &form("Mine now"),
            &editor(vec![(Some(png(8, 8)), "x")]),
            SaveMode::Publish,
        )
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::Core(CoreError::Forbidden(_)));
    assert_eq!(h.stored_paths().await, uploads_before);
    assert_eq!(h.records.find_recipe(recipe.id).await.unwrap().unwrap().title, "Bread");
}

#[tokio::test]
async fn updating_missing_recipe_is_not_found() {
    let h = Harness::new();
    let err = h
        .pipeline()
        .update(&h.session, uuid::Uuid::new_v4(), &form("x"), &editor(vec![]), SaveMode::Draft)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Recipe not found");
}

// ---------------------------------------------------------------------------
// Compensation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_step_insert_restores_previous_state() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let before_steps = h.records.list_steps(recipe.id).await.unwrap();
    let before_paths = h.stored_paths().await;

    h.records.fail_once(StoreOp::InsertSteps).await;
    let err = h
        .pipeline()
        .update(
            &h.session,
            recipe.id,
            &form("Changed"),
            &editor(vec![(Some(png(8, 8)), "new")]),
            SaveMode::Publish,
        )
        .await
        .unwrap_err();
    assert_matches!(err, PipelineError::Store(_));

    let restored = h.records.find_recipe(recipe.id).await.unwrap().unwrap();
    assert_eq!(restored.title, recipe.title);
    assert_eq!(restored.description, recipe.description);
    assert_eq!(restored.cover_image_url, recipe.cover_image_url);
    assert_eq!(restored.updated_at, recipe.updated_at);

    let steps = h.records.list_steps(recipe.id).await.unwrap();
    let summary = |s: &stepdish_db::models::recipe_step::RecipeStep| {
        (s.step_number, s.image_url.clone(), s.description.clone())
    };
    assert_eq!(
        steps.iter().map(summary).collect::<Vec<_>>(),
        before_steps.iter().map(summary).collect::<Vec<_>>()
    );
    assert_eq!(h.stored_paths().await, before_paths);
}

#[tokio::test]
async fn failed_step_delete_restores_recipe_fields() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let before_paths = h.stored_paths().await;

    h.records.fail_once(StoreOp::DeleteSteps).await;
    let err = h
        .pipeline()
        .update(
            &h.session,
            recipe.id,
            &form("Changed"),
            &editor(vec![(Some(png(8, 8)), "new")]),
            SaveMode::Publish,
        )
        .await
        .unwrap_err();
    assert!(err.user_message().starts_with("Save failed"));

    let restored = h.records.find_recipe(recipe.id).await.unwrap().unwrap();
    assert_eq!(restored.title, "Bread");
    assert_eq!(h.records.list_steps(recipe.id).await.unwrap().len(), 2);
    assert_eq!(h.stored_paths().await, before_paths);
}

#[tokio::test]
async fn failed_undo_does_not_mask_original_error() {
    let h = Harness::new();
    let recipe = published(&h).await;
    let before_paths = h.stored_paths().await;

    // The step insert fails, and so does re-inserting the old steps.
    h.records.fail_always(StoreOp::InsertSteps).await;
    let err = h
        .pipeline()
        .update(
            &h.session,
            recipe.id,
            &form("Changed"),
            &editor(vec![(Some(png(8, 8)), "new")]),
            SaveMode::Publish,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Save failed: Store unavailable: InsertSteps failed");

    // The remaining undo steps still ran.
    let restored = h.records.find_recipe(recipe.id).await.unwrap().unwrap();
    assert_eq!(restored.title, "Bread");
    assert_eq!(h.stored_paths().await, before_paths);
}
