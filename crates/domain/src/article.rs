// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::ArticleId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An article as fetched from the article source, keyed by its derived id.
///
/// Only the fields the vote subsystem ranks on are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// The derived article identifier.
    pub id: ArticleId,
    /// The headline.
    pub title: String,
    /// The canonical URL, when the source provided one.
    pub url: Option<String>,
    /// When the source published the article.
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

impl Article {
    /// Creates an article, deriving its identifier from the URL or title.
    ///
    /// # Arguments
    ///
    /// * `title` - The headline
    /// * `url` - The canonical URL, if any
    /// * `published_at` - The publication timestamp
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyArticleSource` if neither a URL nor a title is present.
    pub fn new(
        title: String,
        url: Option<String>,
        published_at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let id: ArticleId = ArticleId::derive(url.as_deref(), Some(title.as_str()))?;
        Ok(Self {
            id,
            title,
            url,
            published_at,
        })
    }
}
