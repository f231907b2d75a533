//! The signed-in user, passed explicitly to every operation that needs it.
//!
//! A [`SessionContext`] is created signed out when the application starts,
//! follows [`AuthEvent`]s from the identity provider, and is cleared on
//! sign-out. Interested parts of the application observe changes through
//! [`SessionContext::subscribe`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::CoreError;
use crate::types::RecordId;

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: RecordId,
    pub email: Option<String>,
}

/// Authentication state changes published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    TokenRefreshed(AuthUser),
    UserUpdated(AuthUser),
    SignedOut,
}

/// Holder of the current user, shared by cloning.
#[derive(Debug, Clone)]
pub struct SessionContext {
    sender: Arc<watch::Sender<Option<AuthUser>>>,
}

impl SessionContext {
    /// A signed-out session.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A session already signed in as `user`.
    pub fn signed_in(user: AuthUser) -> Self {
        let (sender, _) = watch::channel(Some(user));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Apply an identity provider event.
    pub fn apply(&self, event: AuthEvent) {
        let next = match event {
            AuthEvent::SignedIn(user)
            | AuthEvent::TokenRefreshed(user)
            | AuthEvent::UserUpdated(user) => Some(user),
            AuthEvent::SignedOut => None,
        };
        match &next {
            Some(user) => tracing::debug!(user_id = %user.id, "Session updated"),
            None => tracing::debug!("Session cleared"),
        }
        self.sender.send_replace(next);
    }

    /// Clear the session.
    pub fn sign_out(&self) {
        self.apply(AuthEvent::SignedOut);
    }

    pub fn current(&self) -> Option<AuthUser> {
        self.sender.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// The current user, or `Unauthorized` when signed out.
    pub fn require_user(&self) -> Result<AuthUser, CoreError> {
        self.current()
            .ok_or_else(|| CoreError::Unauthorized("Sign in to continue".into()))
    }

    /// Observe session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.sender.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Only a record's author may edit or delete it.
pub fn ensure_author(user: &AuthUser, author_id: RecordId) -> Result<(), CoreError> {
    if user.id == author_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the author can change this recipe".into(),
        ))
    }
}
