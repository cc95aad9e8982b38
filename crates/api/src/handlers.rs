// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vote entry points exposed to the presentation layer.
//!
//! Every write takes an explicit [`SessionContext`]. Nothing here consults
//! ambient identity.

use std::collections::{BTreeMap, BTreeSet};

use newsvote::TransitionResult;
use newsvote_audit::{Actor, AuditEvent, Cause};
use newsvote_domain::{
    Article, ArticleId, DateRange, SortOrder, UserId, VoteKind, VoteRecord, filter_by_date_range,
    sort_articles, top_trending,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::VoteConfig;
use crate::error::{ApiError, translate_domain_error};
use crate::hydrate::{Hydration, hydrate};
use crate::identity::SessionContext;
use crate::request_response::{
    ArticleInput, BatchVotesRequest, BatchVotesResponse, CastVoteRequest, CastVoteResponse,
    DeriveArticleIdRequest, DeriveArticleIdResponse, InconsistentArticlesResponse,
    LedgerEntryInfo, LedgerResponse, RankArticlesRequest, RankArticlesResponse, RankedArticle,
    ReconcileResponse, UserVoteResponse,
};
use crate::store::VoteStore;

/// Actor type recorded for reconciliations.
pub const MAINTENANCE_ACTOR_TYPE: &str = "maintenance";

/// Which slice of the ledger to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerScope {
    /// Every event for one article.
    Article(ArticleId),
    /// Every cast by one user.
    User(UserId),
}

/// Parses an externally supplied article id.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the id is malformed.
pub fn parse_article_id(value: &str) -> Result<ArticleId, ApiError> {
    ArticleId::parse(value).map_err(translate_domain_error)
}

/// Parses an externally supplied user id.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the id is empty or contains control characters.
pub fn parse_user_id(value: &str) -> Result<UserId, ApiError> {
    UserId::new(value).map_err(translate_domain_error)
}

/// Returns the vote record for one article.
///
/// An article nobody has voted on yields the zero record.
///
/// # Errors
///
/// Returns `ApiError::Persistence` if the store fails. A single read is not
/// downgraded to the zero record.
pub async fn get_votes<S: VoteStore>(
    store: &S,
    article_id: &ArticleId,
) -> Result<VoteRecord, ApiError> {
    Ok(store.get_vote_record(article_id).await?)
}

/// Returns the vote records for a batch of articles.
///
/// Every distinct requested id appears in the result. Ids whose fetch failed
/// carry the zero record and are listed in `substituted`.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if an id is malformed or the batch is
/// larger than `config.max_batch_size`.
pub async fn get_batch_votes<S: VoteStore>(
    store: &S,
    config: &VoteConfig,
    request: BatchVotesRequest,
) -> Result<BatchVotesResponse, ApiError> {
    let ids: Vec<ArticleId> = request
        .article_ids
        .iter()
        .map(String::as_str)
        .map(parse_article_id)
        .collect::<Result<_, _>>()?;

    let hydration: Hydration = hydrate(store, &ids, config.max_batch_size).await?;

    Ok(BatchVotesResponse {
        votes: hydration.records,
        substituted: hydration.failed.into_iter().collect(),
    })
}

/// Casts, retracts or switches the session user's vote on an article.
///
/// This function:
/// 1. Rejects anonymous sessions before touching the store
/// 2. Parses the requested vote kind
/// 3. Applies the transition and its ledger event in one transaction
/// 4. Returns the new record and the user's resulting vote
///
/// # Arguments
///
/// * `store` - The vote store
/// * `session` - The caller's identity
/// * `article_id` - The article being voted on
/// * `request` - The requested vote kind
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The session is anonymous (`AuthenticationRequired`)
/// - The vote kind is not `upvote` or `downvote` (`InvalidInput`)
/// - The stored counters would underflow (`InconsistentState`)
/// - The store fails or times out (`Persistence`)
///
/// In every error case nothing has been written.
pub async fn cast_vote<S: VoteStore>(
    store: &S,
    session: &SessionContext,
    article_id: &ArticleId,
    request: CastVoteRequest,
    cause: Cause,
) -> Result<CastVoteResponse, ApiError> {
    let user_id: &UserId = session.require_user()?;

    let kind: VoteKind = request.vote.parse().map_err(translate_domain_error)?;

    let result: TransitionResult = store.cast(article_id, user_id, kind, cause).await?;

    info!(
        article_id = %article_id,
        user_id = %user_id,
        user_vote = ?result.user_vote,
        event_id = ?result.audit_event.event_id,
        "Vote recorded"
    );

    Ok(CastVoteResponse {
        article_id: article_id.clone(),
        record: result.new_record,
        user_vote: result.user_vote,
        change: result.audit_event.action.details.unwrap_or_default(),
        event_id: result.audit_event.event_id,
    })
}

/// Returns the vote a user holds on an article.
///
/// # Errors
///
/// Returns `ApiError::Persistence` if the store fails.
pub async fn get_user_vote<S: VoteStore>(
    store: &S,
    article_id: &ArticleId,
    user_id: &UserId,
) -> Result<UserVoteResponse, ApiError> {
    let record: VoteRecord = store.get_vote_record(article_id).await?;

    Ok(UserVoteResponse {
        article_id: article_id.clone(),
        user_id: user_id.to_string(),
        vote: record.user_vote(user_id),
    })
}

/// Recomputes an article's counters from its voter map.
///
/// This is the explicit repair for records that produced `InconsistentState`.
/// It never runs as a side effect of a cast.
///
/// # Errors
///
/// Returns `AuthenticationRequired` for anonymous sessions, or
/// `Persistence` if the store fails.
pub async fn reconcile_votes<S: VoteStore>(
    store: &S,
    session: &SessionContext,
    article_id: &ArticleId,
    cause: Cause,
) -> Result<ReconcileResponse, ApiError> {
    let operator: &UserId = session.require_user()?;
    let actor: Actor = Actor::new(operator.to_string(), String::from(MAINTENANCE_ACTOR_TYPE));

    let result: TransitionResult = store.reconcile(article_id, actor, cause).await?;
    let corrected: bool = result.audit_event.before != result.audit_event.after;

    info!(
        article_id = %article_id,
        operator = %operator,
        corrected,
        "Reconciliation completed"
    );

    Ok(ReconcileResponse {
        article_id: article_id.clone(),
        record: result.new_record,
        corrected,
        event_id: result.audit_event.event_id,
        details: result.audit_event.action.details,
    })
}

/// Lists articles that need reconciliation.
///
/// # Errors
///
/// Returns `ApiError::Persistence` if the scan fails.
pub async fn find_inconsistent_articles<S: VoteStore>(
    store: &S,
) -> Result<InconsistentArticlesResponse, ApiError> {
    let article_ids: Vec<ArticleId> = store.inconsistent_articles().await?;
    debug!(count = article_ids.len(), "Inconsistent articles found");
    Ok(InconsistentArticlesResponse { article_ids })
}

/// Reads the vote ledger for an article or a user.
///
/// # Errors
///
/// Returns `ApiError::Persistence` if the query fails.
pub async fn get_vote_ledger<S: VoteStore>(
    store: &S,
    scope: &LedgerScope,
) -> Result<LedgerResponse, ApiError> {
    let events: Vec<AuditEvent> = match scope {
        LedgerScope::Article(article_id) => store.ledger_for_article(article_id).await?,
        LedgerScope::User(user_id) => store.ledger_for_user(user_id).await?,
    };

    Ok(LedgerResponse {
        entries: events.into_iter().map(LedgerEntryInfo::from).collect(),
    })
}

/// Derives the stable id for an article from its URL or title.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if both are missing or empty.
pub fn derive_article_id(request: &DeriveArticleIdRequest) -> Result<DeriveArticleIdResponse, ApiError> {
    let article_id: ArticleId =
        ArticleId::derive(request.url.as_deref(), request.title.as_deref())
            .map_err(translate_domain_error)?;
    Ok(DeriveArticleIdResponse { article_id })
}

/// Filters, hydrates and orders a page of articles.
///
/// Votes are hydrated for every article in chunks of
/// `config.max_batch_size`, so a failed fetch ranks as zero votes rather than
/// failing the page. `articles` keeps only those inside the date range, in
/// the requested order. `trending` holds the top `config.trending_limit` of
/// all articles by net score, whatever the date range.
///
/// # Arguments
///
/// * `store` - The vote store
/// * `config` - Batch and trending limits
/// * `request` - The articles with optional sort and range
/// * `now` - The reference time for date ranges
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the sort, range or an article is invalid.
pub async fn rank_articles<S: VoteStore>(
    store: &S,
    config: &VoteConfig,
    request: RankArticlesRequest,
    now: OffsetDateTime,
) -> Result<RankArticlesResponse, ApiError> {
    let order: SortOrder = match request.sort.as_deref() {
        Some(value) => value.parse().map_err(translate_domain_error)?,
        None => SortOrder::default(),
    };
    let range: DateRange = match request.range.as_deref() {
        Some(value) => value.parse().map_err(translate_domain_error)?,
        None => DateRange::default(),
    };

    let articles: Vec<Article> = request
        .articles
        .into_iter()
        .map(|input: ArticleInput| {
            Article::new(input.title, input.url, input.published_at)
                .map_err(translate_domain_error)
        })
        .collect::<Result<_, _>>()?;

    let ids: Vec<ArticleId> = articles
        .iter()
        .map(|a| a.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut votes: BTreeMap<ArticleId, VoteRecord> = BTreeMap::new();
    for chunk in ids.chunks(config.max_batch_size.max(1)) {
        let hydration: Hydration = hydrate(store, chunk, config.max_batch_size.max(1)).await?;
        votes.extend(hydration.records);
    }

    let trending: Vec<Article> = top_trending(&articles, &votes, config.trending_limit);
    let mut visible: Vec<Article> = filter_by_date_range(&articles, range, now);
    sort_articles(&mut visible, order, &votes);

    debug!(
        total = articles.len(),
        visible = visible.len(),
        sort = %order,
        range = %range,
        "Articles ranked"
    );

    let with_votes = |article: Article| -> RankedArticle {
        let record: VoteRecord = votes.get(&article.id).cloned().unwrap_or_default();
        RankedArticle {
            article,
            votes: record,
        }
    };

    Ok(RankArticlesResponse {
        trending: trending.into_iter().map(with_votes).collect(),
        articles: visible.into_iter().map(with_votes).collect(),
    })
}
