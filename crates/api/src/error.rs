// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use newsvote::CoreError;
use newsvote_domain::DomainError;
use newsvote_persistence::PersistenceError;

use crate::identity::IdentityError;

/// API-level errors.
///
/// Every vote write reports exactly one of these on failure, so a caller is
/// never told a vote was recorded when it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A write was attempted without a signed-in user. Nothing was written.
    AuthenticationRequired {
        /// Why no user was available.
        reason: String,
    },
    /// A stored record's counters disagree with its voters.
    ///
    /// Nothing was written. The record needs an explicit reconciliation.
    InconsistentState {
        /// The affected article.
        article_id: String,
        /// A human-readable description of the divergence.
        message: String,
    },
    /// The backing store failed or timed out. Retrying the whole call is safe.
    Persistence {
        /// A description of the failure.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired { reason } => {
                write!(f, "Authentication required: {reason}")
            }
            Self::InconsistentState {
                article_id,
                message,
            } => {
                write!(f, "Inconsistent vote state for {article_id}: {message}")
            }
            Self::Persistence { message } => write!(f, "Persistence error: {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        Self::AuthenticationRequired {
            reason: err.to_string(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::TransitionRejected(core) => translate_core_error(core),
            other => Self::Persistence {
                message: other.to_string(),
            },
        }
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain) => translate_domain_error(domain),
        CoreError::InconsistentState {
            ref article_id,
            kind,
            ref user_id,
        } => ApiError::InconsistentState {
            article_id: article_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            message: format!(
                "removing {user_id}'s {kind} would take the {kind} counter below zero"
            ),
        },
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::EmptyArticleSource => "url",
        DomainError::InvalidArticleId { .. } => "article_id",
        DomainError::InvalidUserId(_) => "user_id",
        DomainError::InvalidVoteKind(_) => "vote",
        DomainError::InvalidSortOrder(_) => "sort",
        DomainError::InvalidDateRange(_) => "range",
    };

    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}
