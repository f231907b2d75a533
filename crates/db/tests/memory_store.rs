//! Behaviour of the in-memory record store.
//!
//! The pipeline tests lean on these semantics matching Postgres:
//! newest-first listings, ordered steps, no cascades, failure injection.

use assert_matches::assert_matches;
use stepdish_db::memory::StoreOp;
use stepdish_db::models::comment::CreateComment;
use stepdish_db::models::profile::UpsertProfile;
use stepdish_db::models::recipe::{CreateRecipe, RecipeFilter, UpdateRecipe};
use stepdish_db::models::recipe_step::CreateRecipeStep;
use stepdish_db::{MemoryStore, RecordStore, StoreError};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_recipe(author_id: Uuid, title: &str, is_public: bool, is_draft: bool) -> CreateRecipe {
    CreateRecipe {
        author_id,
        title: title.to_string(),
        description: None,
        is_public,
        is_draft,
        cover_image_url: None,
    }
}

fn new_step(recipe_id: Uuid, step_number: i32, url: &str) -> CreateRecipeStep {
    CreateRecipeStep {
        recipe_id,
        step_number,
        image_url: url.to_string(),
        description: None,
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_is_newest_first() {
    let store = MemoryStore::new();
    let author = Uuid::new_v4();
    let first = store.insert_recipe(&new_recipe(author, "First", true, false)).await.unwrap();
    let second = store.insert_recipe(&new_recipe(author, "Second", true, false)).await.unwrap();

    let listed = store.list_recipes(&RecipeFilter::by_author(author)).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn feed_filter_hides_drafts_and_private() {
    let store = MemoryStore::new();
    let author = Uuid::new_v4();
    store.insert_recipe(&new_recipe(author, "Public", true, false)).await.unwrap();
    store.insert_recipe(&new_recipe(author, "Private", false, false)).await.unwrap();
    store.insert_recipe(&new_recipe(author, "Draft", true, true)).await.unwrap();

    let feed = store.list_recipes(&RecipeFilter::feed(None)).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, "Public");

    let mine = store.list_recipes(&RecipeFilter::by_author(author)).await.unwrap();
    assert_eq!(mine.len(), 3);
}

#[tokio::test]
async fn feed_search_is_case_insensitive_substring() {
    let store = MemoryStore::new();
    let author = Uuid::new_v4();
    store.insert_recipe(&new_recipe(author, "Lemon Tart", true, false)).await.unwrap();
    store.insert_recipe(&new_recipe(author, "Bread", true, false)).await.unwrap();

    let hits = store.list_recipes(&RecipeFilter::feed(Some("  lemon "))).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Lemon Tart");

    let blank = store.list_recipes(&RecipeFilter::feed(Some("   "))).await.unwrap();
    assert_eq!(blank.len(), 2);
}

#[tokio::test]
async fn update_replaces_fields_and_can_clear_cover() {
    let store = MemoryStore::new();
    let mut input = new_recipe(Uuid::new_v4(), "Soup", true, false);
    input.cover_image_url = Some("https://cdn/a.jpg".into());
    let recipe = store.insert_recipe(&input).await.unwrap();

    let update = UpdateRecipe {
        title: "Stew".into(),
        description: Some("thick".into()),
        is_public: false,
        is_draft: true,
        cover_image_url: None,
    };
    let updated = store.update_recipe(recipe.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.title, "Stew");
    assert_eq!(updated.cover_image_url, None);
    assert!(updated.updated_at >= recipe.updated_at);
    assert_eq!(updated.created_at, recipe.created_at);
}

#[tokio::test]
async fn restore_puts_back_snapshot_with_its_timestamp() {
    let store = MemoryStore::new();
    let snapshot = store
        .insert_recipe(&new_recipe(Uuid::new_v4(), "Soup", true, false))
        .await
        .unwrap();
    let update = UpdateRecipe {
        title: "Stew".into(),
        ..UpdateRecipe::from(&snapshot)
    };
    store.update_recipe(snapshot.id, &update).await.unwrap();

    let restored = store.restore_recipe(&snapshot).await.unwrap().unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(store.find_recipe(snapshot.id).await.unwrap(), Some(snapshot));
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let store = MemoryStore::new();
    let author = Uuid::new_v4();
    store.insert_recipe(&new_recipe(author, "50% Rye", true, false)).await.unwrap();
    store.insert_recipe(&new_recipe(author, "500 Rolls", true, false)).await.unwrap();

    let hits = store.list_recipes(&RecipeFilter::feed(Some("50%"))).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "50% Rye");
}

#[tokio::test]
async fn update_missing_recipe_returns_none() {
    let store = MemoryStore::new();
    let update = UpdateRecipe {
        title: "x".into(),
        description: None,
        is_public: true,
        is_draft: false,
        cover_image_url: None,
    };
    assert!(store.update_recipe(Uuid::new_v4(), &update).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Steps and cascades
// ---------------------------------------------------------------------------

#[tokio::test]
async fn steps_come_back_in_sequence_order() {
    let store = MemoryStore::new();
    let recipe = store
        .insert_recipe(&new_recipe(Uuid::new_v4(), "Pie", true, false))
        .await
        .unwrap();
    store
        .insert_steps(&[
            new_step(recipe.id, 2, "https://cdn/2.jpg"),
            new_step(recipe.id, 1, "https://cdn/1.jpg"),
        ])
        .await
        .unwrap();

    let steps = store.list_steps(recipe.id).await.unwrap();
    let numbers: Vec<i32> = steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn deleting_recipe_does_not_cascade() {
    let store = MemoryStore::new();
    let recipe = store
        .insert_recipe(&new_recipe(Uuid::new_v4(), "Pie", true, false))
        .await
        .unwrap();
    store.insert_steps(&[new_step(recipe.id, 1, "https://cdn/1.jpg")]).await.unwrap();
    store
        .insert_comment(&CreateComment {
            recipe_id: recipe.id,
            author_id: Uuid::new_v4(),
            content: "nice".into(),
        })
        .await
        .unwrap();

    assert!(store.delete_recipe(recipe.id).await.unwrap());
    assert_eq!(store.list_steps(recipe.id).await.unwrap().len(), 1);
    assert_eq!(store.list_comments(recipe.id).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upsert_profile_keeps_creation_time() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    let first = store
        .upsert_profile(&UpsertProfile {
            id,
            display_name: "ann".into(),
            avatar_url: None,
        })
        .await
        .unwrap();
    let second = store
        .upsert_profile(&UpsertProfile {
            id,
            display_name: "Ann B".into(),
            avatar_url: Some("https://cdn/ann.png".into()),
        })
        .await
        .unwrap();

    assert_eq!(second.created_at, first.created_at);
    let found = store.find_profiles(&[id, Uuid::new_v4()]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].display_name, "Ann B");
}

// ---------------------------------------------------------------------------
// Failure injection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fail_once_fails_a_single_write() {
    let store = MemoryStore::new();
    store.fail_once(StoreOp::InsertRecipe).await;

    let input = new_recipe(Uuid::new_v4(), "Cake", true, false);
    assert_matches!(store.insert_recipe(&input).await, Err(StoreError::Unavailable(_)));
    assert!(store.insert_recipe(&input).await.is_ok());
    assert_eq!(store.writes().await, vec![StoreOp::InsertRecipe]);
}

#[tokio::test]
async fn fail_always_holds_until_cleared() {
    let store = MemoryStore::new();
    store.fail_always(StoreOp::DeleteSteps).await;
    let id = Uuid::new_v4();

    assert!(store.delete_steps(id).await.is_err());
    assert!(store.delete_steps(id).await.is_err());
    store.clear_failures().await;
    assert_eq!(store.delete_steps(id).await.unwrap(), 0);
}
