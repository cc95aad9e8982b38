// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use newsvote::{Command, TransitionResult, apply};
use newsvote_audit::{Actor, AuditEvent, Cause};
use newsvote_domain::{ArticleId, UserId, VoteKind, VoteRecord};
use newsvote_persistence::PersistenceError;
use tokio::sync::Barrier;

use crate::identity::{IdentityError, IdentityProvider};
use crate::store::VoteStore;

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn article(url: &str) -> ArticleId {
    ArticleId::derive(Some(url), None).unwrap()
}

pub fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

/// An in-memory store that can be told to fail or to rendezvous on reads.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<ArticleId, VoteRecord>>,
    ledger: Mutex<Vec<AuditEvent>>,
    failing: BTreeSet<ArticleId>,
    barrier: Option<Arc<Barrier>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads for these ids fail with a query error.
    pub fn failing_on(ids: &[ArticleId]) -> Self {
        Self {
            failing: ids.iter().cloned().collect(),
            ..Self::default()
        }
    }

    /// Every read waits until `parties` reads are in flight at once.
    pub fn with_barrier(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn plant(&self, article_id: &ArticleId, record: VoteRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(article_id.clone(), record);
    }

    pub fn record(&self, article_id: &ArticleId) -> VoteRecord {
        self.records
            .lock()
            .unwrap()
            .get(article_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn apply_command(
        &self,
        article_id: &ArticleId,
        command: Command,
        actor: Actor,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let current: VoteRecord = records.get(article_id).cloned().unwrap_or_default();
        let result: TransitionResult = apply(article_id, &current, command, actor, cause)?;
        records.insert(article_id.clone(), result.new_record.clone());

        let mut ledger = self.ledger.lock().unwrap();
        let event_id: i64 = i64::try_from(ledger.len()).unwrap() + 1;
        let event: AuditEvent = result.audit_event.with_event_id(event_id);
        ledger.push(event.clone());

        Ok(TransitionResult {
            audit_event: event,
            ..result
        })
    }
}

impl VoteStore for MemoryStore {
    async fn get_vote_record(&self, article_id: &ArticleId) -> Result<VoteRecord, PersistenceError> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(article_id) {
            return Err(PersistenceError::QueryFailed(format!(
                "simulated failure for {article_id}"
            )));
        }
        Ok(self.record(article_id))
    }

    async fn cast(
        &self,
        article_id: &ArticleId,
        user_id: &UserId,
        kind: VoteKind,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        let command: Command = Command::CastVote {
            user_id: user_id.clone(),
            kind,
        };
        self.apply_command(article_id, command, Actor::user(user_id), cause)
    }

    async fn reconcile(
        &self,
        article_id: &ArticleId,
        actor: Actor,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        self.apply_command(article_id, Command::Reconcile, actor, cause)
    }

    async fn ledger_for_article(
        &self,
        article_id: &ArticleId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn ledger_for_user(&self, user_id: &UserId) -> Result<Vec<AuditEvent>, PersistenceError> {
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn inconsistent_articles(&self) -> Result<Vec<ArticleId>, PersistenceError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| !r.is_consistent())
            .map(|(id, _)| id.clone())
            .collect())
    }
}

/// An identity provider whose prompt resolves to a fixed outcome.
pub struct PromptingIdentity {
    pub current: Option<UserId>,
    pub prompt: Result<UserId, IdentityError>,
}

impl IdentityProvider for PromptingIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.current.clone()
    }

    async fn require_sign_in(&self) -> Result<UserId, IdentityError> {
        if let Some(user) = &self.current {
            return Ok(user.clone());
        }
        self.prompt.clone()
    }
}
