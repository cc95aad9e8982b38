// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response data transfer objects.

use std::collections::BTreeMap;

use newsvote_audit::AuditEvent;
use newsvote_domain::{Article, ArticleId, VoteKind, VoteRecord};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// API request to read several vote records at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchVotesRequest {
    /// The article ids to resolve. Duplicates are allowed and collapse.
    pub article_ids: Vec<String>,
}

/// API response for a batch read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchVotesResponse {
    /// One record per distinct requested id.
    pub votes: BTreeMap<ArticleId, VoteRecord>,
    /// Ids whose fetch failed and which therefore show the zero record.
    pub substituted: Vec<ArticleId>,
}

/// API request to cast a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteRequest {
    /// `upvote` or `downvote`.
    pub vote: String,
}

/// API response for a successful cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteResponse {
    pub article_id: ArticleId,
    /// The record after the cast.
    pub record: VoteRecord,
    /// The vote the user now holds, `None` after a retraction.
    pub user_vote: Option<VoteKind>,
    /// What the cast did, e.g. `switched upvote -> downvote`.
    pub change: String,
    /// The ledger event written with the cast.
    pub event_id: Option<i64>,
}

/// API response for a single user's vote lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVoteResponse {
    pub article_id: ArticleId,
    pub user_id: String,
    pub vote: Option<VoteKind>,
}

/// A ledger event as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntryInfo {
    pub event_id: Option<i64>,
    pub article_id: String,
    pub user_id: Option<String>,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action: String,
    pub details: Option<String>,
    pub before: String,
    pub after: String,
}

impl From<AuditEvent> for LedgerEntryInfo {
    fn from(event: AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            article_id: event.article_id.to_string(),
            user_id: event.user_id.map(String::from),
            actor_id: event.actor.id,
            actor_type: event.actor.actor_type,
            cause_id: event.cause.id,
            cause_description: event.cause.description,
            action: event.action.name,
            details: event.action.details,
            before: event.before.data,
            after: event.after.data,
        }
    }
}

/// API response for a ledger query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerResponse {
    /// Events, oldest first.
    pub entries: Vec<LedgerEntryInfo>,
}

/// API response for a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub article_id: ArticleId,
    /// The record after reconciliation.
    pub record: VoteRecord,
    /// Whether any counter had to be changed.
    pub corrected: bool,
    pub event_id: Option<i64>,
    pub details: Option<String>,
}

/// API response listing articles whose counters disagree with their voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistentArticlesResponse {
    pub article_ids: Vec<ArticleId>,
}

/// API request to derive an article id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveArticleIdRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// API response carrying a derived article id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveArticleIdResponse {
    pub article_id: ArticleId,
}

/// An article as submitted for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

/// API request to order a page of articles by votes or date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankArticlesRequest {
    pub articles: Vec<ArticleInput>,
    /// `highest-votes` (default), `newest` or `oldest`.
    #[serde(default)]
    pub sort: Option<String>,
    /// `all` (default), `today`, `week` or `month`.
    #[serde(default)]
    pub range: Option<String>,
}

/// An article together with its vote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub votes: VoteRecord,
}

/// API response for a ranking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankArticlesResponse {
    /// The filtered articles in the requested order.
    pub articles: Vec<RankedArticle>,
    /// The highest net-score articles among the filtered set.
    pub trending: Vec<RankedArticle>,
}
