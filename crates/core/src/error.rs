// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use newsvote_domain::{ArticleId, DomainError, UserId, VoteKind};

/// Errors that can occur during vote state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// Removing a vote would take a counter below zero.
    ///
    /// The stored counters have diverged from the voter map. The record is
    /// left untouched; repairing it is a separate maintenance operation.
    InconsistentState {
        /// The affected article, when known.
        article_id: Option<ArticleId>,
        /// The counter that would underflow.
        kind: VoteKind,
        /// The user whose vote was being removed.
        user_id: UserId,
    },
}

impl CoreError {
    /// Attaches the article identifier to an `InconsistentState` error.
    #[must_use]
    pub fn for_article(self, id: &ArticleId) -> Self {
        match self {
            Self::InconsistentState {
                article_id: None,
                kind,
                user_id,
            } => Self::InconsistentState {
                article_id: Some(id.clone()),
                kind,
                user_id,
            },
            other => other,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InconsistentState {
                article_id: Some(article_id),
                kind,
                user_id,
            } => write!(
                f,
                "Inconsistent vote state for article {article_id}: removing {user_id}'s {kind} would take the {kind} counter below zero"
            ),
            Self::InconsistentState {
                article_id: None,
                kind,
                user_id,
            } => write!(
                f,
                "Inconsistent vote state: removing {user_id}'s {kind} would take the {kind} counter below zero"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
