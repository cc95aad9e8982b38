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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! The vote transition engine.
//!
//! Everything in this crate is pure: given the current record and a command it
//! computes the next record and the ledger event describing the change.
//! Reading and writing records is the caller's job.

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, reconcile, transition_vote};
pub use command::Command;
pub use error::CoreError;
pub use state::{Reconciliation, TransitionResult, VoteChange, VoteTransition};
