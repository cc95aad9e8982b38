// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vote record queries.
//!
//! Rows are validated on read: counters must fit a `u64` and `voters_json`
//! must be an object mapping user ids to `"upvote"` or `"downvote"`. Whether
//! the counters agree with the voter map is deliberately not checked here.

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use newsvote_domain::{ArticleId, UserId, VoteKind, VoteRecord};

use crate::diesel_schema::vote_records;
use crate::error::PersistenceError;

/// Diesel Queryable struct for vote record rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vote_records)]
struct VoteRecordRow {
    article_id: String,
    upvotes: i64,
    downvotes: i64,
    voters_json: String,
    #[allow(dead_code)]
    updated_at: String,
}

fn malformed(article_id: &str, reason: impl Into<String>) -> PersistenceError {
    PersistenceError::MalformedRecord {
        article_id: article_id.to_string(),
        reason: reason.into(),
    }
}

impl TryFrom<VoteRecordRow> for VoteRecord {
    type Error = PersistenceError;

    fn try_from(row: VoteRecordRow) -> Result<Self, Self::Error> {
        let upvotes: u64 = row
            .upvotes
            .to_u64()
            .ok_or_else(|| malformed(&row.article_id, format!("negative upvotes {}", row.upvotes)))?;
        let downvotes: u64 = row.downvotes.to_u64().ok_or_else(|| {
            malformed(
                &row.article_id,
                format!("negative downvotes {}", row.downvotes),
            )
        })?;
        let voters: BTreeMap<UserId, VoteKind> = serde_json::from_str(&row.voters_json)
            .map_err(|e| malformed(&row.article_id, format!("invalid voters map: {e}")))?;

        Ok(Self::from_parts(upvotes, downvotes, voters))
    }
}

/// Retrieves the record for an article.
///
/// An article nobody has voted on yields the zero record, not an error.
///
/// # Errors
///
/// Returns `PersistenceError::MalformedRecord` if the stored row fails
/// validation, or a database error if the query fails.
pub fn get_vote_record(
    conn: &mut SqliteConnection,
    article_id: &ArticleId,
) -> Result<VoteRecord, PersistenceError> {
    let row: Option<VoteRecordRow> = vote_records::table
        .filter(vote_records::article_id.eq(article_id.as_str()))
        .select(VoteRecordRow::as_select())
        .first::<VoteRecordRow>(conn)
        .optional()?;

    row.map_or_else(|| Ok(VoteRecord::zero()), VoteRecord::try_from)
}

/// Retrieves the records for several articles with one query.
///
/// Every requested id appears in the result. Ids with no stored row map to
/// the zero record; a malformed row fails only its own entry.
///
/// # Errors
///
/// Returns an error if the query itself fails.
pub fn get_vote_records(
    conn: &mut SqliteConnection,
    article_ids: &[ArticleId],
) -> Result<BTreeMap<ArticleId, Result<VoteRecord, PersistenceError>>, PersistenceError> {
    let keys: Vec<&str> = article_ids.iter().map(ArticleId::as_str).collect();
    let rows: Vec<VoteRecordRow> = vote_records::table
        .filter(vote_records::article_id.eq_any(keys))
        .select(VoteRecordRow::as_select())
        .load::<VoteRecordRow>(conn)?;

    let mut stored: BTreeMap<String, VoteRecordRow> = rows
        .into_iter()
        .map(|row| (row.article_id.clone(), row))
        .collect();

    Ok(article_ids
        .iter()
        .map(|id| {
            let record: Result<VoteRecord, PersistenceError> = stored
                .remove(id.as_str())
                .map_or_else(|| Ok(VoteRecord::zero()), VoteRecord::try_from);
            (id.clone(), record)
        })
        .collect())
}

/// Lists the ids of every stored record whose counters disagree with its voter map.
///
/// Rows that fail validation are reported as errors rather than skipped.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_inconsistent_records(
    conn: &mut SqliteConnection,
) -> Result<Vec<ArticleId>, PersistenceError> {
    let rows: Vec<VoteRecordRow> = vote_records::table
        .order(vote_records::article_id.asc())
        .select(VoteRecordRow::as_select())
        .load::<VoteRecordRow>(conn)?;

    let mut inconsistent: Vec<ArticleId> = Vec::new();
    for row in rows {
        let article_id: ArticleId = ArticleId::parse(&row.article_id)
            .map_err(|e| malformed(&row.article_id, e.to_string()))?;
        let record: VoteRecord = VoteRecord::try_from(row)?;
        if !record.is_consistent() {
            inconsistent.push(article_id);
        }
    }

    Ok(inconsistent)
}
