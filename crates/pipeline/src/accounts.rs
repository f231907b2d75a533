//! Finishing sign-up once the identity provider has created the user.

use stepdish_core::error::CoreError;
use stepdish_core::recipe::display_name_or_email;
use stepdish_core::session::AuthUser;
use stepdish_db::models::profile::{Profile, UpsertProfile};

use crate::context::AppContext;
use crate::error::PipelineResult;

#[derive(Clone)]
pub struct AccountService {
    ctx: AppContext,
}

impl AccountService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Create or replace the profile of a newly signed-up user.
    ///
    /// A blank `display_name` falls back to the local part of `email`.
    pub async fn complete_signup(
        &self,
        user: &AuthUser,
        display_name: &str,
        email: &str,
    ) -> PipelineResult<Profile> {
        let display_name = display_name_or_email(display_name, email.trim());
        if display_name.is_empty() {
            return Err(CoreError::Validation("Display name is required".into()).into());
        }

        let profile = self
            .ctx
            .records
            .upsert_profile(&UpsertProfile {
                id: user.id,
                display_name,
                avatar_url: None,
            })
            .await?;
        tracing::info!(user_id = %user.id, "Profile created");
        Ok(profile)
    }
}
