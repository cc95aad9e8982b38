// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity and session handling.
//!
//! There is no ambient "current user". Entry points that write receive a
//! [`SessionContext`] built from an [`IdentityProvider`] by the caller.

use std::future::Future;

use newsvote_domain::UserId;
use thiserror::Error;

use crate::error::ApiError;

/// Failures reported by an identity provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Nobody is signed in and the provider cannot prompt.
    #[error("No user is signed in")]
    NotSignedIn,

    /// The user dismissed the sign-in prompt.
    #[error("Sign-in was cancelled")]
    SignInCancelled,

    /// The provider rejected the sign-in.
    #[error("Sign-in failed: {reason}")]
    SignInFailed { reason: String },
}

/// The external collaborator that knows who is signed in.
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user, if any, without prompting.
    fn current_user(&self) -> Option<UserId>;

    /// Returns the signed-in user, prompting for sign-in if needed.
    ///
    /// Suspends until sign-in completes or fails.
    fn require_sign_in(&self) -> impl Future<Output = Result<UserId, IdentityError>> + Send;
}

/// An identity provider whose answer is fixed up front.
///
/// Suits request-scoped identity, where an upstream gateway has already
/// authenticated the caller and no interactive prompt is possible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    user: Option<UserId>,
}

impl StaticIdentity {
    #[must_use]
    pub const fn new(user: Option<UserId>) -> Self {
        Self { user }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }

    async fn require_sign_in(&self) -> Result<UserId, IdentityError> {
        self.user.clone().ok_or(IdentityError::NotSignedIn)
    }
}

/// The identity a single call acts under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<UserId>,
}

impl SessionContext {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub const fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    /// Captures the provider's current user without prompting.
    #[must_use]
    pub fn from_provider<P: IdentityProvider>(provider: &P) -> Self {
        Self {
            user: provider.current_user(),
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Returns the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthenticationRequired` for an anonymous session.
    pub fn require_user(&self) -> Result<&UserId, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::from(IdentityError::NotSignedIn))
    }
}

/// Prompts for sign-in and returns a session for the resulting user.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationRequired` if sign-in fails or is cancelled.
pub async fn sign_in<P: IdentityProvider>(provider: &P) -> Result<SessionContext, ApiError> {
    let user: UserId = provider.require_sign_in().await?;
    Ok(SessionContext::signed_in(user))
}
