// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Neither a URL nor a title was available to derive an article identifier.
    EmptyArticleSource,
    /// An externally supplied article identifier is malformed.
    InvalidArticleId {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A user identifier is empty or invalid.
    InvalidUserId(String),
    /// A vote kind string is not `upvote` or `downvote`.
    InvalidVoteKind(String),
    /// A sort order string is not recognised.
    InvalidSortOrder(String),
    /// A date range string is not recognised.
    InvalidDateRange(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyArticleSource => {
                write!(f, "Article has neither a URL nor a title to derive an id from")
            }
            Self::InvalidArticleId { value, reason } => {
                write!(f, "Invalid article id '{value}': {reason}")
            }
            Self::InvalidUserId(msg) => write!(f, "Invalid user id: {msg}"),
            Self::InvalidVoteKind(value) => write!(
                f,
                "Invalid vote kind '{value}'. Must be 'upvote' or 'downvote'"
            ),
            Self::InvalidSortOrder(value) => write!(
                f,
                "Invalid sort order '{value}'. Must be 'highest-votes', 'newest' or 'oldest'"
            ),
            Self::InvalidDateRange(value) => write!(
                f,
                "Invalid date range '{value}'. Must be 'all', 'today', 'week' or 'month'"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
