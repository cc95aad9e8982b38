// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use newsvote_domain::{VoteKind, VoteRecord};

use crate::tests::{article, create_test_cause, user};
use crate::{Persistence, PersistenceError};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_enforced() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1: Persistence = Persistence::new_in_memory().unwrap();
    let mut db2: Persistence = Persistence::new_in_memory().unwrap();
    let id = article("https://example.com/isolated");

    db1.cast_vote(&id, &user("alice"), VoteKind::Upvote, create_test_cause())
        .unwrap();

    assert_eq!(db1.get_vote_record(&id).unwrap().upvotes(), 1);
    assert_eq!(db2.get_vote_record(&id).unwrap(), VoteRecord::zero());
}

#[test]
fn test_ledger_rows_require_a_vote_record() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result: Result<(), PersistenceError> = persistence.execute_raw(
        "INSERT INTO vote_ledger (article_id, user_id, actor_json, cause_json, action_json, \
         before_snapshot_json, after_snapshot_json, created_at) \
         VALUES ('orphan', NULL, '{}', '{}', '{}', '{}', '{}', '2026-01-01T00:00:00Z')",
    );

    assert!(result.is_err(), "foreign key must reject orphan ledger rows");
}

#[test]
fn test_counters_cannot_be_stored_negative() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result: Result<(), PersistenceError> = persistence.execute_raw(
        "INSERT INTO vote_records (article_id, upvotes, downvotes, voters_json, updated_at) \
         VALUES ('negative', -1, 0, '{}', '2026-01-01T00:00:00Z')",
    );

    assert!(result.is_err(), "CHECK constraint must reject negative counters");
}
