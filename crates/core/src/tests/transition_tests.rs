// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{record, user};
use crate::{CoreError, VoteChange, VoteTransition, transition_vote};
use newsvote_domain::{VoteKind, VoteRecord};

#[test]
fn test_first_upvote_on_zero_record() {
    let result: VoteTransition =
        transition_vote(&VoteRecord::zero(), &user("alice"), VoteKind::Upvote).unwrap();

    assert_eq!(result.record, record(1, 0, &[("alice", VoteKind::Upvote)]));
    assert_eq!(result.user_vote, Some(VoteKind::Upvote));
    assert_eq!(result.change, VoteChange::Added(VoteKind::Upvote));
}

#[test]
fn test_first_downvote_on_zero_record() {
    let result: VoteTransition =
        transition_vote(&VoteRecord::zero(), &user("alice"), VoteKind::Downvote).unwrap();

    assert_eq!(
        result.record,
        record(0, 1, &[("alice", VoteKind::Downvote)])
    );
    assert_eq!(result.user_vote, Some(VoteKind::Downvote));
}

#[test]
fn test_repeating_a_vote_retracts_it() {
    let current: VoteRecord = record(1, 0, &[("alice", VoteKind::Upvote)]);
    let result: VoteTransition =
        transition_vote(&current, &user("alice"), VoteKind::Upvote).unwrap();

    assert_eq!(result.record, VoteRecord::zero());
    assert_eq!(result.user_vote, None);
    assert_eq!(result.change, VoteChange::Retracted(VoteKind::Upvote));
}

#[test]
fn test_switching_upvote_to_downvote() {
    let current: VoteRecord = record(1, 0, &[("alice", VoteKind::Upvote)]);
    let result: VoteTransition =
        transition_vote(&current, &user("alice"), VoteKind::Downvote).unwrap();

    assert_eq!(
        result.record,
        record(0, 1, &[("alice", VoteKind::Downvote)])
    );
    assert_eq!(result.user_vote, Some(VoteKind::Downvote));
    assert_eq!(
        result.change,
        VoteChange::Switched {
            from: VoteKind::Upvote,
            to: VoteKind::Downvote
        }
    );
}

#[test]
fn test_other_voters_are_untouched() {
    let current: VoteRecord = record(
        2,
        1,
        &[
            ("alice", VoteKind::Upvote),
            ("bob", VoteKind::Upvote),
            ("carol", VoteKind::Downvote),
        ],
    );
    let result: VoteTransition =
        transition_vote(&current, &user("dave"), VoteKind::Downvote).unwrap();

    assert_eq!(
        result.record,
        record(
            2,
            2,
            &[
                ("alice", VoteKind::Upvote),
                ("bob", VoteKind::Upvote),
                ("carol", VoteKind::Downvote),
                ("dave", VoteKind::Downvote),
            ],
        )
    );
}

#[test]
fn test_input_record_is_not_modified() {
    let current: VoteRecord = record(1, 0, &[("alice", VoteKind::Upvote)]);
    let snapshot: VoteRecord = current.clone();

    let _ = transition_vote(&current, &user("alice"), VoteKind::Downvote).unwrap();

    assert_eq!(current, snapshot);
}

#[test]
fn test_retract_with_zero_counter_is_inconsistent() {
    // voters says alice upvoted but the counter was never incremented
    let current: VoteRecord = record(0, 0, &[("alice", VoteKind::Upvote)]);
    let result: Result<VoteTransition, CoreError> =
        transition_vote(&current, &user("alice"), VoteKind::Upvote);

    assert_eq!(
        result,
        Err(CoreError::InconsistentState {
            article_id: None,
            kind: VoteKind::Upvote,
            user_id: user("alice"),
        })
    );
}

#[test]
fn test_switch_with_zero_counter_is_inconsistent() {
    let current: VoteRecord = record(0, 3, &[("alice", VoteKind::Upvote)]);
    let result: Result<VoteTransition, CoreError> =
        transition_vote(&current, &user("alice"), VoteKind::Downvote);

    assert!(matches!(
        result,
        Err(CoreError::InconsistentState {
            kind: VoteKind::Upvote,
            ..
        })
    ));
}

#[test]
fn test_transition_is_deterministic() {
    let current: VoteRecord = record(1, 1, &[("a", VoteKind::Upvote), ("b", VoteKind::Downvote)]);

    let first: VoteTransition = transition_vote(&current, &user("b"), VoteKind::Upvote).unwrap();
    let second: VoteTransition = transition_vote(&current, &user("b"), VoteKind::Upvote).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_vote_change_display() {
    assert_eq!(
        VoteChange::Added(VoteKind::Upvote).to_string(),
        "added upvote"
    );
    assert_eq!(
        VoteChange::Retracted(VoteKind::Downvote).to_string(),
        "retracted downvote"
    );
    assert_eq!(
        VoteChange::Switched {
            from: VoteKind::Upvote,
            to: VoteKind::Downvote
        }
        .to_string(),
        "switched upvote -> downvote"
    );
}
