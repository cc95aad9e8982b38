// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use newsvote_audit::AuditEvent;
use newsvote_domain::UserId;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::vote_ledger;
use crate::error::PersistenceError;

/// Appends an event to the vote ledger.
///
/// The record for `event.article_id` must already exist.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The ledger event to append
/// * `created_at` - RFC 3339 timestamp of the write
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn append_ledger_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };

    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };

    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };

    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };

    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    let actor_json: String = serde_json::to_string(&actor_data)?;
    let cause_json: String = serde_json::to_string(&cause_data)?;
    let action_json: String = serde_json::to_string(&action_data)?;
    let before_json: String = serde_json::to_string(&before_data)?;
    let after_json: String = serde_json::to_string(&after_data)?;

    diesel::insert_into(vote_ledger::table)
        .values((
            vote_ledger::article_id.eq(event.article_id.as_str()),
            vote_ledger::user_id.eq(event.user_id.as_ref().map(UserId::as_str)),
            vote_ledger::actor_json.eq(actor_json),
            vote_ledger::cause_json.eq(cause_json),
            vote_ledger::action_json.eq(action_json),
            vote_ledger::before_snapshot_json.eq(before_json),
            vote_ledger::after_snapshot_json.eq(after_json),
            vote_ledger::created_at.eq(created_at),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}
