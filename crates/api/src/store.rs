// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Async access to vote records.
//!
//! The persistence crate is synchronous. [`SqliteVoteStore`] moves each call
//! onto the blocking pool so the async entry points never stall the runtime.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures::future::join_all;
use newsvote::TransitionResult;
use newsvote_audit::{Actor, AuditEvent, Cause};
use newsvote_domain::{ArticleId, UserId, VoteKind, VoteRecord};
use newsvote_persistence::{Persistence, PersistenceError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::VoteConfig;

/// Per-id results of a batch read. Every requested id is a key.
pub type BatchRecords = BTreeMap<ArticleId, Result<VoteRecord, PersistenceError>>;

/// Keyed storage of vote records with atomic read-modify-write.
///
/// Implementations serialize writes per article. Callers never see or manage
/// the underlying locking.
pub trait VoteStore: Send + Sync {
    /// Returns the record for an article, or the zero record if nobody has voted.
    fn get_vote_record(
        &self,
        article_id: &ArticleId,
    ) -> impl Future<Output = Result<VoteRecord, PersistenceError>> + Send;

    /// Returns the record for every id in `article_ids`.
    ///
    /// An outer error fails the whole batch; an inner error fails one id.
    /// By default each id is fetched concurrently with `get_vote_record`.
    fn get_vote_records(
        &self,
        article_ids: &BTreeSet<ArticleId>,
    ) -> impl Future<Output = Result<BatchRecords, PersistenceError>> + Send {
        async move {
            let fetches = article_ids.iter().map(|id| async move {
                let result: Result<VoteRecord, PersistenceError> = self.get_vote_record(id).await;
                (id.clone(), result)
            });
            Ok(join_all(fetches).await.into_iter().collect())
        }
    }

    /// Applies one user's vote and persists the result atomically.
    ///
    /// A `PersistenceError::Timeout` means nothing was written, so the whole
    /// call may be retried.
    fn cast(
        &self,
        article_id: &ArticleId,
        user_id: &UserId,
        kind: VoteKind,
        cause: Cause,
    ) -> impl Future<Output = Result<TransitionResult, PersistenceError>> + Send;

    /// Recomputes an article's counters from its voter map.
    fn reconcile(
        &self,
        article_id: &ArticleId,
        actor: Actor,
        cause: Cause,
    ) -> impl Future<Output = Result<TransitionResult, PersistenceError>> + Send;

    /// Returns the ledger for an article, oldest first.
    fn ledger_for_article(
        &self,
        article_id: &ArticleId,
    ) -> impl Future<Output = Result<Vec<AuditEvent>, PersistenceError>> + Send;

    /// Returns every ledger event caused by a user's votes, oldest first.
    fn ledger_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<AuditEvent>, PersistenceError>> + Send;

    /// Lists articles whose counters disagree with their voter map.
    fn inconsistent_articles(
        &self,
    ) -> impl Future<Output = Result<Vec<ArticleId>, PersistenceError>> + Send;
}

const QUEUED: u8 = 0;
const STARTED: u8 = 1;
const ABANDONED: u8 = 2;

/// Settles the race between a queued blocking call and its caller's timeout.
///
/// Exactly one side wins: either the task starts work, or the caller
/// abandons it before it touches the database.
#[derive(Clone, Default)]
struct Claim(Arc<AtomicU8>);

impl Claim {
    /// Claims the call for the task. Fails once the caller has abandoned it.
    fn start(&self) -> bool {
        self.0
            .compare_exchange(QUEUED, STARTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Abandons the call. Fails once the task has started.
    fn abandon(&self) -> bool {
        self.0
            .compare_exchange(QUEUED, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// A [`VoteStore`] backed by a single SQLite connection.
///
/// Batch reads use one `IN (..)` query, so a page of ids holds the
/// connection once rather than once per id.
#[derive(Clone)]
pub struct SqliteVoteStore {
    persistence: Arc<Mutex<Persistence>>,
    cast_timeout: Duration,
    read_timeout: Duration,
}

impl SqliteVoteStore {
    /// Wraps a persistence handle.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The open database
    /// * `config` - Supplies the read and write timeouts
    #[must_use]
    pub fn new(persistence: Persistence, config: &VoteConfig) -> Self {
        Self::from_shared(Arc::new(Mutex::new(persistence)), config)
    }

    /// Builds a store over a handle that other components also hold.
    #[must_use]
    pub const fn from_shared(persistence: Arc<Mutex<Persistence>>, config: &VoteConfig) -> Self {
        Self {
            persistence,
            cast_timeout: config.cast_timeout,
            read_timeout: config.read_timeout,
        }
    }

    /// Returns the shared persistence handle.
    #[must_use]
    pub fn shared(&self) -> Arc<Mutex<Persistence>> {
        Arc::clone(&self.persistence)
    }

    #[must_use]
    pub const fn cast_timeout(&self) -> Duration {
        self.cast_timeout
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Queues `op` on the blocking pool behind the connection lock.
    ///
    /// The task runs `op` only if it wins `claim`; otherwise it returns
    /// `Timeout(limit)` without touching the database.
    fn spawn<T, F>(&self, claim: &Claim, limit: Duration, op: F) -> JoinHandle<Result<T, PersistenceError>>
    where
        T: Send + 'static,
        F: FnOnce(&mut Persistence) -> Result<T, PersistenceError> + Send + 'static,
    {
        let persistence: Arc<Mutex<Persistence>> = Arc::clone(&self.persistence);
        let claim: Claim = claim.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = persistence.blocking_lock();
            if !claim.start() {
                debug!("Store call abandoned before it started");
                return Err(PersistenceError::Timeout(limit));
            }
            op(&mut guard)
        })
    }

    /// Runs a read and waits at most `read_timeout`.
    async fn read<T, F>(&self, op: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Persistence) -> Result<T, PersistenceError> + Send + 'static,
    {
        let claim: Claim = Claim::default();
        let handle = self.spawn(&claim, self.read_timeout, op);

        if let Ok(joined) = tokio::time::timeout(self.read_timeout, handle).await {
            return joined.map_err(task_failed)?;
        }
        claim.abandon();
        warn!(
            timeout_ms = self.read_timeout.as_millis(),
            "Vote read did not finish in time"
        );
        Err(PersistenceError::Timeout(self.read_timeout))
    }

    /// Runs a write and waits at most `cast_timeout` for it to start.
    ///
    /// A write still queued when the time runs out is abandoned and never
    /// runs, so `Timeout` always means nothing was written. A write that has
    /// already begun its transaction is waited on, and its real outcome is
    /// returned.
    async fn write<T, F>(&self, op: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Persistence) -> Result<T, PersistenceError> + Send + 'static,
    {
        let claim: Claim = Claim::default();
        let mut handle = self.spawn(&claim, self.cast_timeout, op);

        if let Ok(joined) = tokio::time::timeout(self.cast_timeout, &mut handle).await {
            return joined.map_err(task_failed)?;
        }

        if claim.abandon() {
            warn!(
                timeout_ms = self.cast_timeout.as_millis(),
                "Vote write did not start in time; nothing written"
            );
            return Err(PersistenceError::Timeout(self.cast_timeout));
        }

        debug!("Vote write already in progress; waiting for it to finish");
        handle.await.map_err(task_failed)?
    }
}

fn task_failed(err: tokio::task::JoinError) -> PersistenceError {
    PersistenceError::Other(format!("Vote store task failed: {err}"))
}

impl VoteStore for SqliteVoteStore {
    async fn get_vote_record(&self, article_id: &ArticleId) -> Result<VoteRecord, PersistenceError> {
        let article_id: ArticleId = article_id.clone();
        debug!(article_id = %article_id, "Fetching vote record");
        self.read(move |p| p.get_vote_record(&article_id)).await
    }

    async fn get_vote_records(
        &self,
        article_ids: &BTreeSet<ArticleId>,
    ) -> Result<BatchRecords, PersistenceError> {
        let article_ids: Vec<ArticleId> = article_ids.iter().cloned().collect();
        debug!(count = article_ids.len(), "Fetching vote records in one query");
        self.read(move |p| p.get_vote_records(&article_ids)).await
    }

    async fn cast(
        &self,
        article_id: &ArticleId,
        user_id: &UserId,
        kind: VoteKind,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        let article_id: ArticleId = article_id.clone();
        let user_id: UserId = user_id.clone();
        self.write(move |p| p.cast_vote(&article_id, &user_id, kind, cause))
            .await
    }

    async fn reconcile(
        &self,
        article_id: &ArticleId,
        actor: Actor,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        let article_id: ArticleId = article_id.clone();
        self.write(move |p| p.reconcile_record(&article_id, actor, cause))
            .await
    }

    async fn ledger_for_article(
        &self,
        article_id: &ArticleId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        let article_id: ArticleId = article_id.clone();
        self.read(move |p| p.get_ledger_for_article(&article_id))
            .await
    }

    async fn ledger_for_user(&self, user_id: &UserId) -> Result<Vec<AuditEvent>, PersistenceError> {
        let user_id: UserId = user_id.clone();
        self.read(move |p| p.get_ledger_for_user(&user_id)).await
    }

    async fn inconsistent_articles(&self) -> Result<Vec<ArticleId>, PersistenceError> {
        self.read(Persistence::list_inconsistent_records).await
    }
}
