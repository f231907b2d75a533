//! Comments under a recipe.

use serde::Serialize;
use stepdish_core::error::CoreError;
use stepdish_core::recipe::normalize_comment;
use stepdish_core::session::SessionContext;
use stepdish_core::types::RecordId;
use stepdish_db::models::comment::{Comment, CreateComment};
use stepdish_db::models::profile::ProfileSummary;

use crate::context::AppContext;
use crate::error::PipelineResult;
use crate::readers::{profile_summaries, visible_recipe};

/// A comment joined with its author's profile.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Option<ProfileSummary>,
}

#[derive(Clone)]
pub struct CommentService {
    ctx: AppContext,
}

impl CommentService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Comments on a recipe, oldest first.
    ///
    /// Follows the recipe's visibility: comments under a draft or private
    /// recipe are only listed for its author.
    pub async fn list(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
    ) -> PipelineResult<Vec<CommentView>> {
        visible_recipe(self.ctx.records.as_ref(), session, recipe_id).await?;

        let comments = self.ctx.records.list_comments(recipe_id).await?;
        let author_ids: Vec<RecordId> = comments.iter().map(|c| c.author_id).collect();
        let authors = profile_summaries(self.ctx.records.as_ref(), &author_ids).await?;

        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                author: authors.get(&comment.author_id).cloned(),
                comment,
            })
            .collect())
    }

    /// Post a comment as the signed-in user on a recipe they can see.
    pub async fn add(
        &self,
        session: &SessionContext,
        recipe_id: RecordId,
        content: &str,
    ) -> PipelineResult<Comment> {
        let user = session.require_user()?;
        let content = normalize_comment(content)?;

        visible_recipe(self.ctx.records.as_ref(), session, recipe_id).await?;

        let comment = self
            .ctx
            .records
            .insert_comment(&CreateComment {
                recipe_id,
                author_id: user.id,
                content,
            })
            .await?;
        tracing::debug!(comment_id = %comment.id, recipe_id = %recipe_id, "Comment added");
        Ok(comment)
    }

    /// Delete a comment. Only its author may.
    pub async fn delete(
        &self,
        session: &SessionContext,
        comment_id: RecordId,
    ) -> PipelineResult<()> {
        let user = session.require_user()?;
        let comment = self
            .ctx
            .records
            .find_comment(comment_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Comment",
                id: comment_id,
            })?;

        if comment.author_id != user.id {
            return Err(
                CoreError::Forbidden("Only the author can delete this comment".into()).into(),
            );
        }

        self.ctx.records.delete_comment(comment_id).await?;
        Ok(())
    }
}
