// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `votes`: vote records, validated on read
//! - `ledger`: vote ledger events

pub mod ledger;
pub mod votes;

pub use ledger::{get_ledger_event, get_ledger_for_article, get_ledger_for_user};
pub use votes::{get_vote_record, get_vote_records, list_inconsistent_records};
