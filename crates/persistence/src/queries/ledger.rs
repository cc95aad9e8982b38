// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vote ledger queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use newsvote_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use newsvote_domain::{ArticleId, UserId};

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::vote_ledger;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full ledger rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vote_ledger)]
struct LedgerRow {
    event_id: i64,
    article_id: String,
    user_id: Option<String>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    #[allow(dead_code)]
    created_at: String,
}

impl TryFrom<LedgerRow> for AuditEvent {
    type Error = PersistenceError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let actor_data: ActorData = serde_json::from_str(&row.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&row.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

        let article_id: ArticleId = ArticleId::parse(&row.article_id)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        let user_id: Option<UserId> = row
            .user_id
            .as_deref()
            .map(UserId::new)
            .transpose()
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        Ok(Self::new(
            Actor::new(actor_data.id, actor_data.actor_type),
            Cause::new(cause_data.id, cause_data.description),
            Action::new(action_data.name, action_data.details),
            StateSnapshot::new(before_data.data),
            StateSnapshot::new(after_data.data),
            article_id,
            user_id,
        )
        .with_event_id(row.event_id))
    }
}

/// Retrieves a ledger event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_ledger_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: LedgerRow = vote_ledger::table
        .filter(vote_ledger::event_id.eq(event_id))
        .select(LedgerRow::as_select())
        .first::<LedgerRow>(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?;

    AuditEvent::try_from(row)
}

/// Retrieves every ledger event for an article, oldest first.
///
/// # Errors
///
/// Returns an error if events cannot be retrieved or deserialized.
pub fn get_ledger_for_article(
    conn: &mut SqliteConnection,
    article_id: &ArticleId,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    vote_ledger::table
        .filter(vote_ledger::article_id.eq(article_id.as_str()))
        .order(vote_ledger::event_id.asc())
        .select(LedgerRow::as_select())
        .load::<LedgerRow>(conn)?
        .into_iter()
        .map(AuditEvent::try_from)
        .collect()
}

/// Retrieves every ledger event caused by a user's casts, oldest first.
///
/// # Errors
///
/// Returns an error if events cannot be retrieved or deserialized.
pub fn get_ledger_for_user(
    conn: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    vote_ledger::table
        .filter(vote_ledger::user_id.eq(user_id.as_str()))
        .order(vote_ledger::event_id.asc())
        .select(LedgerRow::as_select())
        .load::<LedgerRow>(conn)?
        .into_iter()
        .map(AuditEvent::try_from)
        .collect()
}
