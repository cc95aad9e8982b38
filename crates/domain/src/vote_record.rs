// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{UserId, VoteKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate vote counters and per-user votes for one article.
///
/// Serialises as `{"upvotes": n, "downvotes": n, "voters": {"<user>": "upvote" | "downvote"}}`.
///
/// Counters are unsigned, so a negative value can never be read back.
/// Consistency between the counters and `voters` is maintained by the
/// transition engine; `is_consistent` reports whether it currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    upvotes: u64,
    downvotes: u64,
    #[serde(default)]
    voters: BTreeMap<UserId, VoteKind>,
}

/// Counter values recomputed from a record's voter map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of voters holding an upvote.
    pub upvotes: u64,
    /// Number of voters holding a downvote.
    pub downvotes: u64,
}

impl VoteRecord {
    /// Returns the zero-value record used for articles nobody has voted on.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            upvotes: 0,
            downvotes: 0,
            voters: BTreeMap::new(),
        }
    }

    /// Assembles a record from stored parts.
    ///
    /// No consistency check is performed; stored state is taken as found.
    #[must_use]
    pub const fn from_parts(
        upvotes: u64,
        downvotes: u64,
        voters: BTreeMap<UserId, VoteKind>,
    ) -> Self {
        Self {
            upvotes,
            downvotes,
            voters,
        }
    }

    #[must_use]
    pub const fn upvotes(&self) -> u64 {
        self.upvotes
    }

    #[must_use]
    pub const fn downvotes(&self) -> u64 {
        self.downvotes
    }

    #[must_use]
    pub const fn voters(&self) -> &BTreeMap<UserId, VoteKind> {
        &self.voters
    }

    /// Returns the counter for the given vote kind.
    #[must_use]
    pub const fn count(&self, kind: VoteKind) -> u64 {
        match kind {
            VoteKind::Upvote => self.upvotes,
            VoteKind::Downvote => self.downvotes,
        }
    }

    /// Returns the vote a user currently holds on this article, if any.
    #[must_use]
    pub fn user_vote(&self, user_id: &UserId) -> Option<VoteKind> {
        self.voters.get(user_id).copied()
    }

    /// Upvotes minus downvotes.
    #[must_use]
    pub fn net_score(&self) -> i64 {
        let up: i64 = i64::try_from(self.upvotes).unwrap_or(i64::MAX);
        let down: i64 = i64::try_from(self.downvotes).unwrap_or(i64::MAX);
        up.saturating_sub(down)
    }

    /// Returns true when nobody has voted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upvotes == 0 && self.downvotes == 0 && self.voters.is_empty()
    }

    /// Recomputes the counters from the voter map.
    #[must_use]
    pub fn tally(&self) -> Tally {
        self.voters
            .values()
            .fold(Tally::default(), |mut tally, kind| {
                match kind {
                    VoteKind::Upvote => tally.upvotes += 1,
                    VoteKind::Downvote => tally.downvotes += 1,
                }
                tally
            })
    }

    /// Returns true when both counters match the voter map.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let tally: Tally = self.tally();
        tally.upvotes == self.upvotes && tally.downvotes == self.downvotes
    }
}
