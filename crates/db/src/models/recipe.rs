//! Recipe records (`recipes` table).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stepdish_core::types::{RecordId, Timestamp};

/// A row from the `recipes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecordId,
    pub author_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_draft: bool,
    /// URL of the first step image, if any.
    pub cover_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Recipe {
    /// Shown in the public feed.
    pub fn is_published(&self) -> bool {
        self.is_public && !self.is_draft
    }
}

/// DTO for creating a new recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipe {
    pub author_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_draft: bool,
    pub cover_image_url: Option<String>,
}

/// DTO replacing every editable field of a recipe.
///
/// Nullable fields are written as given, so `None` clears them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateRecipe {
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_draft: bool,
    pub cover_image_url: Option<String>,
}

impl From<&Recipe> for UpdateRecipe {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            is_public: recipe.is_public,
            is_draft: recipe.is_draft,
            cover_image_url: recipe.cover_image_url.clone(),
        }
    }
}

/// Selection criteria for recipe listings. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author_id: Option<RecordId>,
    /// Only public, non-draft recipes.
    pub published_only: bool,
    /// Case-insensitive substring of the title.
    pub title_search: Option<String>,
}

impl RecipeFilter {
    /// The public feed, optionally narrowed by a title search.
    pub fn feed(search: Option<&str>) -> Self {
        Self {
            author_id: None,
            published_only: true,
            title_search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Everything one author owns, drafts and private recipes included.
    pub fn by_author(author_id: RecordId) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    /// Whether `recipe` satisfies this filter.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if self.author_id.is_some_and(|id| id != recipe.author_id) {
            return false;
        }
        if self.published_only && !recipe.is_published() {
            return false;
        }
        match &self.title_search {
            Some(search) => recipe
                .title
                .to_lowercase()
                .contains(&search.to_lowercase()),
            None => true,
        }
    }
}
