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
    clippy::all
)]

//! Vote ledger events.
//!
//! The ledger is an append-only side log fed by the transition engine. It is
//! never read back to compute counters.

use newsvote_domain::{ArticleId, UserId, VoteRecord};

#[cfg(test)]
mod tests;

/// The entity that requested a vote state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "user", "maintenance").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// An actor representing a signed-in user.
    #[must_use]
    pub fn user(user_id: &UserId) -> Self {
        Self::new(user_id.to_string(), String::from("user"))
    }
}

/// The trigger for a change, typically an HTTP request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    pub id: String,
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// What happened, e.g. `CastVote` with details `switched upvote -> downvote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action.
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A compact rendering of a vote record at one point in time.
///
/// The form is `upvotes=<n>,downvotes=<n>,voters=<n>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Renders the counters and voter count of a record.
    #[must_use]
    pub fn of_record(record: &VoteRecord) -> Self {
        Self::new(format!(
            "upvotes={},downvotes={},voters={}",
            record.upvotes(),
            record.downvotes(),
            record.voters().len()
        ))
    }
}

/// An immutable ledger entry describing one vote state transition.
///
/// Every successful cast or reconciliation produces exactly one event, which
/// is written in the same transaction as the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Assigned by the store when the event is persisted; `None` before that.
    pub event_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    /// The record before the transition.
    pub before: StateSnapshot,
    /// The record after the transition.
    pub after: StateSnapshot,
    /// The article whose record changed.
    pub article_id: ArticleId,
    /// The voter, when the change was a cast. Reconciliations carry `None`.
    pub user_id: Option<UserId>,
}

impl AuditEvent {
    /// Creates a new, not yet persisted, `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The record before the transition
    /// * `after` - The record after the transition
    /// * `article_id` - The article the record belongs to
    /// * `user_id` - The voting user, if any
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        article_id: ArticleId,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            article_id,
            user_id,
        }
    }

    /// Returns the event with its persisted identifier attached.
    #[must_use]
    pub fn with_event_id(self, event_id: i64) -> Self {
        Self {
            event_id: Some(event_id),
            ..self
        }
    }
}
