// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use newsvote_audit::{Actor, Cause};
use newsvote_domain::{ArticleId, UserId, VoteKind, VoteRecord};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("alice"), String::from("user"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Cast vote request"))
}

pub fn create_test_article() -> ArticleId {
    ArticleId::derive(Some("https://example.com/a"), None).unwrap()
}

pub fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

/// Builds a record from explicit counters and voters, consistent or not.
pub fn record(upvotes: u64, downvotes: u64, voters: &[(&str, VoteKind)]) -> VoteRecord {
    let voters: BTreeMap<UserId, VoteKind> = voters
        .iter()
        .map(|(name, kind)| (user(name), *kind))
        .collect();
    VoteRecord::from_parts(upvotes, downvotes, voters)
}
