// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::validation::{validate_article_id, validate_user_id};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum length of an article identifier.
pub const MAX_ARTICLE_ID_LEN: usize = 50;

/// A stable identifier for an article, used as the vote record key.
///
/// Identifiers are derived from the article's canonical URL (falling back to
/// its title) and contain only ASCII alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleId {
    value: String,
}

impl ArticleId {
    /// Derives the identifier for an article.
    ///
    /// The first non-empty of `url` and `title` is Base64 encoded, stripped
    /// of non-alphanumeric characters and truncated to
    /// [`MAX_ARTICLE_ID_LEN`] characters. The same inputs always produce the
    /// same identifier.
    ///
    /// # Arguments
    ///
    /// * `url` - The article's canonical URL, if known
    /// * `title` - The article's title, if known
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyArticleSource` if both inputs are absent or empty.
    pub fn derive(url: Option<&str>, title: Option<&str>) -> Result<Self, DomainError> {
        let source: &str = url
            .filter(|u| !u.is_empty())
            .or_else(|| title.filter(|t| !t.is_empty()))
            .ok_or(DomainError::EmptyArticleSource)?;

        let value: String = STANDARD
            .encode(source.as_bytes())
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(MAX_ARTICLE_ID_LEN)
            .collect();

        Ok(Self { value })
    }

    /// Parses an externally supplied article identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArticleId` if the value is empty, too long,
    /// or contains characters other than ASCII letters and digits.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        validate_article_id(value)?;
        Ok(Self {
            value: value.to_string(),
        })
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for ArticleId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_article_id(&value)?;
        Ok(Self { value })
    }
}

impl From<ArticleId> for String {
    fn from(id: ArticleId) -> Self {
        id.value
    }
}

/// Identifies a signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
    value: String,
}

impl UserId {
    /// Creates a new `UserId`.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUserId` if the trimmed value is empty.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        validate_user_id(trimmed)?;
        Ok(Self {
            value: trimmed.to_string(),
        })
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.value
    }
}

/// The direction of a single user's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// The user approves of the article.
    Upvote,
    /// The user disapproves of the article.
    Downvote,
}

impl VoteKind {
    /// Returns the wire representation of this vote kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }

    /// Returns the other vote kind.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Upvote => Self::Downvote,
            Self::Downvote => Self::Upvote,
        }
    }
}

impl FromStr for VoteKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            _ => Err(DomainError::InvalidVoteKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for VoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
