// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use newsvote_audit::AuditEvent;
use newsvote_domain::{Tally, VoteKind, VoteRecord};

/// Which row of the transition table a cast hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// The user had no vote and now holds one.
    Added(VoteKind),
    /// The user repeated their vote, which removes it.
    Retracted(VoteKind),
    /// The user replaced one vote kind with the other.
    Switched {
        from: VoteKind,
        to: VoteKind,
    },
}

impl std::fmt::Display for VoteChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added(kind) => write!(f, "added {kind}"),
            Self::Retracted(kind) => write!(f, "retracted {kind}"),
            Self::Switched { from, to } => write!(f, "switched {from} -> {to}"),
        }
    }
}

/// The output of the transition engine for a single cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTransition {
    /// The complete next record. Callers must persist all of it at once.
    pub record: VoteRecord,
    /// The vote the user holds after the cast, for highlighting.
    pub user_vote: Option<VoteKind>,
    /// The kind of change made.
    pub change: VoteChange,
}

/// The result of recomputing a record's counters from its voter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The repaired record.
    pub record: VoteRecord,
    /// The counters as they were stored before the repair.
    pub previous: Tally,
    /// Whether any counter changed.
    pub corrected: bool,
}

/// The result of a successful command.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new record after the transition.
    pub new_record: VoteRecord,
    /// For casts, the vote the acting user now holds. Always `None` for reconciliations.
    pub user_vote: Option<VoteKind>,
    /// The ledger event recording this transition.
    pub audit_event: AuditEvent,
}
