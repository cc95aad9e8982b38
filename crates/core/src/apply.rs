// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{Reconciliation, TransitionResult, VoteChange, VoteTransition};
use newsvote_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use newsvote_domain::{ArticleId, Tally, UserId, VoteKind, VoteRecord};
use std::collections::BTreeMap;

/// Computes the next record for a single cast.
///
/// | existing | requested | result                                   |
/// |----------|-----------|------------------------------------------|
/// | none     | X         | increment X, `voters[user] = X`          |
/// | X        | X         | decrement X, remove `voters[user]`       |
/// | X        | Y         | decrement X, increment Y, `voters[user] = Y` |
///
/// # Arguments
///
/// * `record` - The current record, or the zero record if none exists
/// * `user_id` - The voting user
/// * `kind` - The requested vote kind
///
/// # Errors
///
/// Returns `CoreError::InconsistentState` if a decrement would take a counter
/// below zero. The input record is never clamped or repaired.
pub fn transition_vote(
    record: &VoteRecord,
    user_id: &UserId,
    kind: VoteKind,
) -> Result<VoteTransition, CoreError> {
    let mut upvotes: u64 = record.upvotes();
    let mut downvotes: u64 = record.downvotes();
    let mut voters: BTreeMap<UserId, VoteKind> = record.voters().clone();

    let change: VoteChange = match record.user_vote(user_id) {
        None => {
            increment(&mut upvotes, &mut downvotes, kind);
            voters.insert(user_id.clone(), kind);
            VoteChange::Added(kind)
        }
        Some(existing) if existing == kind => {
            decrement(&mut upvotes, &mut downvotes, kind, user_id)?;
            voters.remove(user_id);
            VoteChange::Retracted(kind)
        }
        Some(existing) => {
            decrement(&mut upvotes, &mut downvotes, existing, user_id)?;
            increment(&mut upvotes, &mut downvotes, kind);
            voters.insert(user_id.clone(), kind);
            VoteChange::Switched {
                from: existing,
                to: kind,
            }
        }
    };

    let user_vote: Option<VoteKind> = voters.get(user_id).copied();

    Ok(VoteTransition {
        record: VoteRecord::from_parts(upvotes, downvotes, voters),
        user_vote,
        change,
    })
}

const fn increment(upvotes: &mut u64, downvotes: &mut u64, kind: VoteKind) {
    match kind {
        VoteKind::Upvote => *upvotes = upvotes.saturating_add(1),
        VoteKind::Downvote => *downvotes = downvotes.saturating_add(1),
    }
}

fn decrement(
    upvotes: &mut u64,
    downvotes: &mut u64,
    kind: VoteKind,
    user_id: &UserId,
) -> Result<(), CoreError> {
    let counter: &mut u64 = match kind {
        VoteKind::Upvote => upvotes,
        VoteKind::Downvote => downvotes,
    };

    *counter = counter
        .checked_sub(1)
        .ok_or_else(|| CoreError::InconsistentState {
            article_id: None,
            kind,
            user_id: user_id.clone(),
        })?;

    Ok(())
}

/// Recomputes a record's counters from its voter map.
///
/// The voter map is taken as authoritative. A consistent record comes back
/// unchanged with `corrected == false`.
#[must_use]
pub fn reconcile(record: &VoteRecord) -> Reconciliation {
    let tally: Tally = record.tally();
    let previous: Tally = Tally {
        upvotes: record.upvotes(),
        downvotes: record.downvotes(),
    };

    Reconciliation {
        record: VoteRecord::from_parts(tally.upvotes, tally.downvotes, record.voters().clone()),
        previous,
        corrected: tally != previous,
    }
}

/// Applies a command to an article's record, producing the new record and
/// its ledger event.
///
/// # Arguments
///
/// * `article_id` - The article the record belongs to
/// * `record` - The current record (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new record and audit event
/// * `Err(CoreError)` if the command cannot be applied
///
/// # Errors
///
/// Returns `CoreError::InconsistentState` (carrying `article_id`) when a cast
/// would underflow a counter.
pub fn apply(
    article_id: &ArticleId,
    record: &VoteRecord,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = StateSnapshot::of_record(record);

    match command {
        Command::CastVote { user_id, kind } => {
            let transition: VoteTransition = transition_vote(record, &user_id, kind)
                .map_err(|err| err.for_article(article_id))?;

            let action: Action = Action::new(
                String::from("CastVote"),
                Some(transition.change.to_string()),
            );
            let after: StateSnapshot = StateSnapshot::of_record(&transition.record);
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                article_id.clone(),
                Some(user_id),
            );

            Ok(TransitionResult {
                new_record: transition.record,
                user_vote: transition.user_vote,
                audit_event,
            })
        }
        Command::Reconcile => {
            let reconciliation: Reconciliation = reconcile(record);

            let details: String = if reconciliation.corrected {
                format!(
                    "corrected upvotes {} -> {}, downvotes {} -> {}",
                    reconciliation.previous.upvotes,
                    reconciliation.record.upvotes(),
                    reconciliation.previous.downvotes,
                    reconciliation.record.downvotes()
                )
            } else {
                String::from("counters already consistent")
            };

            let action: Action = Action::new(String::from("ReconcileRecord"), Some(details));
            let after: StateSnapshot = StateSnapshot::of_record(&reconciliation.record);
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                article_id.clone(),
                None,
            );

            Ok(TransitionResult {
                new_record: reconciliation.record,
                user_vote: None,
                audit_event,
            })
        }
    }
}
