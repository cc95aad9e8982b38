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

mod article;
mod error;
mod ranking;
mod types;
mod validation;
mod vote_record;

#[cfg(test)]
mod tests;

// Re-export public types
pub use article::Article;
pub use error::DomainError;
pub use ranking::{
    DEFAULT_TRENDING_LIMIT, DateRange, SortOrder, filter_by_date_range, sort_articles,
    top_trending,
};
pub use types::{ArticleId, MAX_ARTICLE_ID_LEN, UserId, VoteKind};
pub use validation::{validate_article_id, validate_user_id};
pub use vote_record::{Tally, VoteRecord};
