//! Field rules for recipe metadata, comments and profiles.
//!
//! All checks here run before any network call, so a failure never leaves
//! partial state behind.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Message shown when the title is missing or blank.
pub const TITLE_REQUIRED: &str = "Title is required";

/// Message shown when a published recipe has no step with a photo.
pub const PHOTO_REQUIRED: &str = "Add at least one step with a photo";

/// Message shown when a comment is blank.
pub const COMMENT_REQUIRED: &str = "Comment cannot be empty";

/// Whether a save publishes the recipe or keeps it as a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    Publish,
    Draft,
}

impl SaveMode {
    pub fn is_draft(self) -> bool {
        matches!(self, Self::Draft)
    }
}

/// Trim the title, rejecting it if nothing is left.
pub fn normalize_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(TITLE_REQUIRED.into()));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text; blank becomes `None`.
pub fn normalize_optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A published recipe needs at least one step with a photo. Drafts are exempt.
pub fn require_photo(mode: SaveMode, has_photo: bool) -> Result<(), CoreError> {
    if mode.is_draft() || has_photo {
        Ok(())
    } else {
        Err(CoreError::Validation(PHOTO_REQUIRED.into()))
    }
}

/// Trim comment content, rejecting it if nothing is left.
pub fn normalize_comment(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(COMMENT_REQUIRED.into()));
    }
    Ok(trimmed.to_string())
}

/// The display name a new profile gets: the chosen name, or the part of
/// the email before `@` when none was given.
pub fn display_name_or_email(display_name: &str, email: &str) -> String {
    match normalize_optional_text(display_name) {
        Some(name) => name,
        None => email.split('@').next().unwrap_or_default().to_string(),
    }
}
