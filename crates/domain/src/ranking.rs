// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client-side ordering and filtering of already-fetched articles.
//!
//! These functions never touch storage. Vote counts come from a hydrated
//! map; articles missing from the map rank as if nobody had voted.

use crate::article::Article;
use crate::error::DomainError;
use crate::types::ArticleId;
use crate::vote_record::VoteRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use time::{Duration, OffsetDateTime, UtcOffset};

/// Number of articles shown in the trending strip.
pub const DEFAULT_TRENDING_LIMIT: usize = 3;

/// How a list of articles is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Most upvotes first, newest first among ties.
    #[default]
    HighestVotes,
    /// Most recently published first.
    Newest,
    /// Least recently published first.
    Oldest,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HighestVotes => "highest-votes",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest-votes" => Ok(Self::HighestVotes),
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            _ => Err(DomainError::InvalidSortOrder(s.to_string())),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication window used to filter a list of articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// No filtering.
    #[default]
    All,
    /// Published on the same UTC calendar day as `now`.
    Today,
    /// Published within the last 7 days.
    Week,
    /// Published within the last 30 days.
    Month,
}

impl DateRange {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Returns whether an article published at `published_at` falls in this range.
    #[must_use]
    pub fn contains(&self, published_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Today => {
                published_at.to_offset(UtcOffset::UTC).date() == now.to_offset(UtcOffset::UTC).date()
            }
            Self::Week => within(published_at, now, Duration::days(7)),
            Self::Month => within(published_at, now, Duration::days(30)),
        }
    }
}

fn within(published_at: OffsetDateTime, now: OffsetDateTime, window: Duration) -> bool {
    now.checked_sub(window)
        .is_none_or(|cutoff| published_at >= cutoff)
}

impl FromStr for DateRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(DomainError::InvalidDateRange(s.to_string())),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keeps the articles published within `range`, preserving order.
#[must_use]
pub fn filter_by_date_range(
    articles: &[Article],
    range: DateRange,
    now: OffsetDateTime,
) -> Vec<Article> {
    articles
        .iter()
        .filter(|article| range.contains(article.published_at, now))
        .cloned()
        .collect()
}

fn upvotes_of(votes: &BTreeMap<ArticleId, VoteRecord>, id: &ArticleId) -> u64 {
    votes.get(id).map_or(0, VoteRecord::upvotes)
}

fn net_score_of(votes: &BTreeMap<ArticleId, VoteRecord>, id: &ArticleId) -> i64 {
    votes.get(id).map_or(0, VoteRecord::net_score)
}

/// Sorts articles in place.
///
/// The sort is stable, so articles that compare equal keep their source order.
pub fn sort_articles(
    articles: &mut [Article],
    order: SortOrder,
    votes: &BTreeMap<ArticleId, VoteRecord>,
) {
    match order {
        SortOrder::HighestVotes => articles.sort_by(|a, b| {
            upvotes_of(votes, &b.id)
                .cmp(&upvotes_of(votes, &a.id))
                .then_with(|| b.published_at.cmp(&a.published_at))
        }),
        SortOrder::Newest => articles.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
        SortOrder::Oldest => articles.sort_by(|a, b| a.published_at.cmp(&b.published_at)),
    }
}

/// Returns up to `limit` articles with the highest net score.
#[must_use]
pub fn top_trending(
    articles: &[Article],
    votes: &BTreeMap<ArticleId, VoteRecord>,
    limit: usize,
) -> Vec<Article> {
    let mut ranked: Vec<Article> = articles.to_vec();
    ranked.sort_by(|a, b| -> Ordering {
        net_score_of(votes, &b.id).cmp(&net_score_of(votes, &a.id))
    });
    ranked.truncate(limit);
    ranked
}
