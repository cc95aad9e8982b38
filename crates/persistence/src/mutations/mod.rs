// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `votes`: full-record upserts
//! - `ledger`: ledger appends
//!
//! `persist_transition` combines the two and must run inside a transaction.

pub mod ledger;
pub mod votes;

use diesel::SqliteConnection;
use newsvote::TransitionResult;
use newsvote_domain::ArticleId;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::error::PersistenceError;

pub use ledger::append_ledger_event;
pub use votes::upsert_vote_record;

/// Writes a transition's record and ledger event.
///
/// # Arguments
///
/// * `conn` - A connection with an open transaction
/// * `result` - The transition to persist
///
/// # Returns
///
/// The event ID assigned to the ledger event.
///
/// # Errors
///
/// Returns an error if either write fails. The caller's transaction is then
/// rolled back so neither write is visible.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    let now: String = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let article_id: &ArticleId = &result.audit_event.article_id;

    upsert_vote_record(conn, article_id, &result.new_record, &now)?;
    debug!(article_id = %article_id, "Wrote vote record");

    let event_id: i64 = append_ledger_event(conn, &result.audit_event, &now)?;
    debug!(event_id, "Appended ledger event");

    Ok(event_id)
}
