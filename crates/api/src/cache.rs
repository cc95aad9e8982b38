// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-session memory of the signed-in user's own votes.
//!
//! Used only for highlighting. Aggregate counts always come from the store.

use std::collections::{BTreeMap, BTreeSet};

use newsvote_domain::{ArticleId, UserId, VoteKind};
use tracing::debug;

use crate::hydrate::{Hydration, fetch_all};
use crate::identity::SessionContext;
use crate::store::VoteStore;

/// Remembers which way the current user voted on each visible article.
///
/// An anonymous cache holds no entries. Changing user drops everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSessionCache {
    user: Option<UserId>,
    votes: BTreeMap<ArticleId, Option<VoteKind>>,
}

impl VoteSessionCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user: None,
            votes: BTreeMap::new(),
        }
    }

    /// Creates a cache for the session's user.
    #[must_use]
    pub fn for_session(session: &SessionContext) -> Self {
        Self {
            user: session.user().cloned(),
            votes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Switches to a different user. Entries are cleared if the user changed.
    pub fn set_user(&mut self, user: Option<UserId>) {
        if self.user != user {
            debug!(
                previous = ?self.user.as_ref().map(UserId::as_str),
                next = ?user.as_ref().map(UserId::as_str),
                "Vote session user changed"
            );
            self.user = user;
            self.votes.clear();
        }
    }

    pub fn sign_out(&mut self) {
        self.set_user(None);
    }

    /// Looks up the user's vote for every id not already resolved.
    ///
    /// Returns how many ids were newly resolved. Ids whose fetch failed stay
    /// unresolved and are retried on the next call.
    pub async fn resolve<S: VoteStore>(&mut self, store: &S, ids: &[ArticleId]) -> usize {
        let Some(user) = self.user.clone() else {
            return 0;
        };

        let pending: BTreeSet<ArticleId> = ids
            .iter()
            .filter(|id| !self.votes.contains_key(*id))
            .cloned()
            .collect();

        if pending.is_empty() {
            return 0;
        }

        let hydration: Hydration = fetch_all(store, pending).await;

        let mut resolved: usize = 0;
        for (id, record) in hydration.records {
            if hydration.failed.contains(&id) {
                continue;
            }
            self.votes.insert(id, record.user_vote(&user));
            resolved += 1;
        }
        resolved
    }

    /// Records the vote returned by a successful cast.
    ///
    /// Ignored for anonymous sessions.
    pub fn record_cast(&mut self, article_id: ArticleId, user_vote: Option<VoteKind>) {
        if self.user.is_some() {
            self.votes.insert(article_id, user_vote);
        }
    }

    /// The user's vote on an article, `None` if they have not voted or it is unresolved.
    #[must_use]
    pub fn user_vote(&self, article_id: &ArticleId) -> Option<VoteKind> {
        self.votes.get(article_id).copied().flatten()
    }

    #[must_use]
    pub fn is_resolved(&self, article_id: &ArticleId) -> bool {
        self.votes.contains_key(article_id)
    }

    /// Drops entries for articles no longer visible.
    pub fn retain_articles(&mut self, visible: &[ArticleId]) {
        let visible: BTreeSet<&ArticleId> = visible.iter().collect();
        self.votes.retain(|id, _| visible.contains(id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
