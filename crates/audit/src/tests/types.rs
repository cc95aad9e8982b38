// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use crate::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use newsvote_domain::{ArticleId, UserId, VoteKind, VoteRecord};

fn article() -> ArticleId {
    ArticleId::parse("aHR0cHM6Ly9leGFtcGxlLmNvbS9h").unwrap()
}

fn sample_event() -> AuditEvent {
    AuditEvent::new(
        Actor::new(String::from("alice"), String::from("user")),
        Cause::new(String::from("req-456"), String::from("Cast vote request")),
        Action::new(String::from("CastVote"), Some(String::from("added upvote"))),
        StateSnapshot::new(String::from("upvotes=0,downvotes=0,voters=0")),
        StateSnapshot::new(String::from("upvotes=1,downvotes=0,voters=1")),
        article(),
        Some(UserId::new("alice").unwrap()),
    )
}

#[test]
fn test_actor_for_user() {
    let user: UserId = UserId::new("alice").unwrap();
    let actor: Actor = Actor::user(&user);

    assert_eq!(actor.id, "alice");
    assert_eq!(actor.actor_type, "user");
}

#[test]
fn test_action_creation_with_details() {
    let action: Action = Action::new(
        String::from("CastVote"),
        Some(String::from("switched upvote -> downvote")),
    );

    assert_eq!(action.name, "CastVote");
    assert_eq!(
        action.details,
        Some(String::from("switched upvote -> downvote"))
    );
}

#[test]
fn test_snapshot_of_zero_record() {
    let snapshot: StateSnapshot = StateSnapshot::of_record(&VoteRecord::zero());
    assert_eq!(snapshot.data, "upvotes=0,downvotes=0,voters=0");
}

#[test]
fn test_snapshot_of_populated_record() {
    let mut voters: BTreeMap<UserId, VoteKind> = BTreeMap::new();
    voters.insert(UserId::new("alice").unwrap(), VoteKind::Upvote);
    voters.insert(UserId::new("bob").unwrap(), VoteKind::Downvote);
    voters.insert(UserId::new("carol").unwrap(), VoteKind::Upvote);
    let record: VoteRecord = VoteRecord::from_parts(2, 1, voters);

    let snapshot: StateSnapshot = StateSnapshot::of_record(&record);
    assert_eq!(snapshot.data, "upvotes=2,downvotes=1,voters=3");
}

#[test]
fn test_new_event_is_unpersisted() {
    let event: AuditEvent = sample_event();

    assert_eq!(event.event_id, None);
    assert_eq!(event.article_id, article());
    assert_eq!(event.user_id, Some(UserId::new("alice").unwrap()));
}

#[test]
fn test_with_event_id_keeps_other_fields() {
    let event: AuditEvent = sample_event();
    let persisted: AuditEvent = event.clone().with_event_id(42);

    assert_eq!(persisted.event_id, Some(42));
    assert_eq!(persisted.actor, event.actor);
    assert_eq!(persisted.action, event.action);
    assert_eq!(persisted.before, event.before);
    assert_eq!(persisted.after, event.after);
}

#[test]
fn test_audit_event_equality() {
    let first: AuditEvent = sample_event();
    let second: AuditEvent = sample_event();
    assert_eq!(first, second);

    let other: AuditEvent = AuditEvent {
        user_id: None,
        ..sample_event()
    };
    assert_ne!(first, other);
}
