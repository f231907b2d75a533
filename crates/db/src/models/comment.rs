//! Comment records (`comments` table).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stepdish_core::types::{RecordId, Timestamp};

/// A row from the `comments` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: RecordId,
    pub recipe_id: RecordId,
    pub author_id: RecordId,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub recipe_id: RecordId,
    pub author_id: RecordId,
    pub content: String,
}
