// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use newsvote_audit::{Actor, Cause};
use newsvote_domain::{ArticleId, UserId};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("ops"), String::from("maintenance"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn article(url: &str) -> ArticleId {
    ArticleId::derive(Some(url), None).unwrap()
}

pub fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}
