// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use newsvote_domain::{UserId, VoteKind};

/// A command represents user or maintenance intent as data only.
///
/// Commands are the only way to request a change to a vote record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cast, retract or switch a user's vote.
    CastVote {
        /// The voting user.
        user_id: UserId,
        /// The requested vote kind.
        kind: VoteKind,
    },
    /// Recompute the counters from the voter map.
    ///
    /// This is an explicit maintenance operation and is never issued as part
    /// of a cast.
    Reconcile,
}
