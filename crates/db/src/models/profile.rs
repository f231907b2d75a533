//! User profiles (`profiles` table).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stepdish_core::types::{RecordId, Timestamp};

/// A row from the `profiles` table. `id` is the identity provider's user id.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: RecordId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting or replacing a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProfile {
    pub id: RecordId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// The author fields joined onto recipes and comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}
