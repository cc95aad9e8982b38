// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{record, user};
use crate::{Reconciliation, VoteTransition, reconcile, transition_vote};
use newsvote_domain::{Tally, VoteKind, VoteRecord};

#[test]
fn test_reconcile_consistent_record_is_noop() {
    let current: VoteRecord = record(1, 1, &[("a", VoteKind::Upvote), ("b", VoteKind::Downvote)]);
    let result: Reconciliation = reconcile(&current);

    assert!(!result.corrected);
    assert_eq!(result.record, current);
}

#[test]
fn test_reconcile_repairs_diverged_counters() {
    let current: VoteRecord = record(
        0,
        5,
        &[("a", VoteKind::Upvote), ("b", VoteKind::Downvote)],
    );
    let result: Reconciliation = reconcile(&current);

    assert!(result.corrected);
    assert_eq!(
        result.previous,
        Tally {
            upvotes: 0,
            downvotes: 5
        }
    );
    assert_eq!(result.record.upvotes(), 1);
    assert_eq!(result.record.downvotes(), 1);
    assert!(result.record.is_consistent());
}

#[test]
fn test_reconciled_record_accepts_previously_failing_cast() {
    let current: VoteRecord = record(0, 0, &[("alice", VoteKind::Upvote)]);
    assert!(transition_vote(&current, &user("alice"), VoteKind::Upvote).is_err());

    let repaired: VoteRecord = reconcile(&current).record;
    let result: VoteTransition =
        transition_vote(&repaired, &user("alice"), VoteKind::Upvote).unwrap();

    assert_eq!(result.record, VoteRecord::zero());
}
