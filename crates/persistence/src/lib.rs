// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the news vote subsystem.
//!
//! Vote records and the vote ledger live in `SQLite`, accessed through Diesel.
//!
//! ## Atomicity
//!
//! `cast_vote` and `reconcile_record` run as a single `BEGIN IMMEDIATE`
//! transaction: read the record, run the transition engine, write the full
//! record, append the ledger event, commit. Two writers on the same database
//! file are serialized by `SQLite`'s write lock, so concurrent casts never lose
//! an update. Any error rolls back both writes.
//!
//! ## Reads
//!
//! A missing record reads as the zero record. Stored rows are validated on
//! read and rejected as `MalformedRecord` if their shape is wrong. Rows whose
//! counters disagree with their voters are returned as found; the
//! disagreement surfaces as `InconsistentState` on the next conflicting cast.
//!
//! ## Testing Philosophy
//!
//! - Standard tests use unique in-memory databases
//! - Multi-connection behaviour is tested against a file in the OS temp dir

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use newsvote::{Command, TransitionResult, apply};
use newsvote_audit::{Actor, AuditEvent, Cause};
use newsvote_domain::{ArticleId, UserId, VoteKind, VoteRecord};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default time a connection waits on another connection's write lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

/// Connection options for file-backed databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceOptions {
    /// How long to wait on a lock held by another connection before failing.
    pub busy_timeout: Duration,
}

impl Default for PersistenceOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Persistence adapter for vote records and the vote ledger.
///
/// This is the only writer of vote records.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(&shared_memory_url, DEFAULT_BUSY_TIMEOUT)?;

        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database
    /// and default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        Self::new_with_file_and_options(path, PersistenceOptions::default())
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Several adapters, in this process or others, may open the same file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `options` - Connection options
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file_and_options<P: AsRef<Path>>(
        path: P,
        options: PersistenceOptions,
    ) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(path_str, options.busy_timeout)?;

        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Vote Records
    // ========================================================================

    /// Retrieves the record for an article, or the zero record if nobody has voted.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if the stored row is invalid, or a database error.
    pub fn get_vote_record(
        &mut self,
        article_id: &ArticleId,
    ) -> Result<VoteRecord, PersistenceError> {
        queries::get_vote_record(&mut self.conn, article_id)
    }

    /// Retrieves the records for several articles with a single query.
    ///
    /// Every requested id is present in the result. Absent rows read as the
    /// zero record; a malformed row fails only its own entry.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn get_vote_records(
        &mut self,
        article_ids: &[ArticleId],
    ) -> Result<BTreeMap<ArticleId, Result<VoteRecord, PersistenceError>>, PersistenceError> {
        queries::get_vote_records(&mut self.conn, article_ids)
    }

    /// Casts, retracts or switches a user's vote in one atomic read-modify-write.
    ///
    /// # Arguments
    ///
    /// * `article_id` - The article being voted on
    /// * `user_id` - The voting user
    /// * `kind` - The requested vote kind
    /// * `cause` - The request that triggered the cast
    ///
    /// # Returns
    ///
    /// The transition with its ledger event's `event_id` filled in.
    ///
    /// # Errors
    ///
    /// Returns `TransitionRejected` wrapping `CoreError::InconsistentState` if
    /// a counter would underflow, or a database error. Nothing is written in
    /// either case.
    pub fn cast_vote(
        &mut self,
        article_id: &ArticleId,
        user_id: &UserId,
        kind: VoteKind,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        let command: Command = Command::CastVote {
            user_id: user_id.clone(),
            kind,
        };
        let result: TransitionResult =
            self.apply_and_persist(article_id, command, Actor::user(user_id), cause)?;

        info!(
            article_id = %article_id,
            user_id = %user_id,
            kind = %kind,
            upvotes = result.new_record.upvotes(),
            downvotes = result.new_record.downvotes(),
            "Vote cast"
        );

        Ok(result)
    }

    /// Recomputes an article's counters from its voter map and stores the result.
    ///
    /// A ledger event is written even when nothing needed correcting.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed or the write fails.
    pub fn reconcile_record(
        &mut self,
        article_id: &ArticleId,
        actor: Actor,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        let result: TransitionResult =
            self.apply_and_persist(article_id, Command::Reconcile, actor, cause)?;

        info!(
            article_id = %article_id,
            details = result.audit_event.action.details.as_deref().unwrap_or_default(),
            "Vote record reconciled"
        );

        Ok(result)
    }

    /// Lists articles whose stored counters disagree with their voter map.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_inconsistent_records(&mut self) -> Result<Vec<ArticleId>, PersistenceError> {
        queries::list_inconsistent_records(&mut self.conn)
    }

    fn apply_and_persist(
        &mut self,
        article_id: &ArticleId,
        command: Command,
        actor: Actor,
        cause: Cause,
    ) -> Result<TransitionResult, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let current: VoteRecord = queries::get_vote_record(conn, article_id)?;
            let result: TransitionResult = apply(article_id, &current, command, actor, cause)?;
            let event_id: i64 = mutations::persist_transition(conn, &result)?;

            Ok(TransitionResult {
                audit_event: result.audit_event.with_event_id(event_id),
                ..result
            })
        })
    }

    // ========================================================================
    // Vote Ledger
    // ========================================================================

    /// Retrieves a ledger event by ID.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if no such event exists.
    pub fn get_ledger_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::get_ledger_event(&mut self.conn, event_id)
    }

    /// Retrieves the ledger for an article, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an event cannot be deserialized.
    pub fn get_ledger_for_article(
        &mut self,
        article_id: &ArticleId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::get_ledger_for_article(&mut self.conn, article_id)
    }

    /// Retrieves every cast a user has made, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an event cannot be deserialized.
    pub fn get_ledger_for_user(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::get_ledger_for_user(&mut self.conn, user_id)
    }

    /// Runs raw SQL against the connection.
    ///
    /// Only used by tests to plant rows that the normal write path refuses to produce.
    #[cfg(test)]
    pub(crate) fn execute_raw(&mut self, sql: &str) -> Result<(), PersistenceError> {
        use diesel::connection::SimpleConnection;

        self.conn
            .batch_execute(sql)
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))
    }
}
