// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod cache;
mod config;
mod error;
mod handlers;
mod hydrate;
mod identity;
mod request_response;
mod store;

#[cfg(test)]
mod tests;

pub use cache::VoteSessionCache;
pub use config::{DEFAULT_CAST_TIMEOUT, DEFAULT_MAX_BATCH_SIZE, DEFAULT_READ_TIMEOUT, VoteConfig};
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use handlers::{
    LedgerScope, MAINTENANCE_ACTOR_TYPE, cast_vote, derive_article_id, find_inconsistent_articles,
    get_batch_votes, get_user_vote, get_vote_ledger, get_votes, parse_article_id, parse_user_id,
    rank_articles, reconcile_votes,
};
pub use hydrate::{Hydration, hydrate};
pub use identity::{IdentityError, IdentityProvider, SessionContext, StaticIdentity, sign_in};
pub use request_response::{
    ArticleInput, BatchVotesRequest, BatchVotesResponse, CastVoteRequest, CastVoteResponse,
    DeriveArticleIdRequest, DeriveArticleIdResponse, InconsistentArticlesResponse,
    LedgerEntryInfo, LedgerResponse, RankArticlesRequest, RankArticlesResponse, RankedArticle,
    ReconcileResponse, UserVoteResponse,
};
pub use store::{BatchRecords, SqliteVoteStore, VoteStore};
