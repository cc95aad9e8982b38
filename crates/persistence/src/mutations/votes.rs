// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use newsvote_domain::{ArticleId, VoteRecord};
use num_traits::ToPrimitive;

use crate::diesel_schema::vote_records;
use crate::error::PersistenceError;

fn counter_to_i64(value: u64) -> Result<i64, PersistenceError> {
    value
        .to_i64()
        .ok_or_else(|| PersistenceError::SerializationError(format!("Counter {value} out of range")))
}

/// Writes the full record for an article, creating the row on first vote.
///
/// Counters and voters are always written together in one statement.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `article_id` - The article the record belongs to
/// * `record` - The complete record to store
/// * `updated_at` - RFC 3339 timestamp of the write
///
/// # Errors
///
/// Returns an error if serialization or the upsert fails.
pub fn upsert_vote_record(
    conn: &mut SqliteConnection,
    article_id: &ArticleId,
    record: &VoteRecord,
    updated_at: &str,
) -> Result<(), PersistenceError> {
    let upvotes: i64 = counter_to_i64(record.upvotes())?;
    let downvotes: i64 = counter_to_i64(record.downvotes())?;
    let voters_json: String = serde_json::to_string(record.voters())?;

    diesel::insert_into(vote_records::table)
        .values((
            vote_records::article_id.eq(article_id.as_str()),
            vote_records::upvotes.eq(upvotes),
            vote_records::downvotes.eq(downvotes),
            vote_records::voters_json.eq(voters_json.as_str()),
            vote_records::updated_at.eq(updated_at),
        ))
        .on_conflict(vote_records::article_id)
        .do_update()
        .set((
            vote_records::upvotes.eq(upvotes),
            vote_records::downvotes.eq(downvotes),
            vote_records::voters_json.eq(voters_json.as_str()),
            vote_records::updated_at.eq(updated_at),
        ))
        .execute(conn)?;

    Ok(())
}
