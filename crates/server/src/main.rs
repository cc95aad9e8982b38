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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use newsvote_api::{
    ApiError, BatchVotesRequest, BatchVotesResponse, CastVoteRequest, CastVoteResponse,
    DeriveArticleIdRequest, DeriveArticleIdResponse, InconsistentArticlesResponse, LedgerResponse,
    LedgerScope, RankArticlesRequest, RankArticlesResponse, ReconcileResponse, SqliteVoteStore,
    UserVoteResponse, VoteConfig, cast_vote, derive_article_id, find_inconsistent_articles,
    get_batch_votes, get_user_vote, get_vote_ledger, get_votes, parse_article_id, parse_user_id,
    rank_articles, reconcile_votes,
};
use newsvote_audit::Cause;
use newsvote_domain::{ArticleId, UserId, VoteRecord};
use newsvote_persistence::{Persistence, PersistenceOptions};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::session::RequestSession;

/// News vote server - HTTP surface for the vote aggregation subsystem
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How long a vote write may take before the caller gets an error
    #[arg(long, default_value_t = 5000)]
    cast_timeout_ms: u64,

    /// How long a read may take before batch reads fall back to zero records
    #[arg(long, default_value_t = 2000)]
    read_timeout_ms: u64,

    /// Largest number of article ids accepted in one batch read
    #[arg(long, default_value_t = 100)]
    max_batch_size: usize,

    /// How long a connection waits on another connection's write lock
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,
}

impl Args {
    fn vote_config(&self) -> VoteConfig {
        VoteConfig {
            cast_timeout: Duration::from_millis(self.cast_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            max_batch_size: self.max_batch_size,
            ..VoteConfig::default()
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    store: SqliteVoteStore,
    config: VoteConfig,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationRequired { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::InconsistentState { .. } => StatusCode::CONFLICT,
            ApiError::Persistence { .. } => {
                error!(error = %err, "Persistence error");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Builds a cause for a request-initiated change.
fn request_cause(description: &str) -> Cause {
    let timestamp: i64 = OffsetDateTime::now_utc().unix_timestamp();
    Cause::new(
        format!("req_{timestamp}_{}", rand::random::<u64>()),
        description.to_string(),
    )
}

/// Handler for GET `/votes/{article_id}`.
async fn handle_get_votes(
    AxumState(app_state): AxumState<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<VoteRecord>, HttpError> {
    let article_id: ArticleId = parse_article_id(&article_id)?;
    let record: VoteRecord = get_votes(&app_state.store, &article_id).await?;
    Ok(Json(record))
}

/// Handler for POST `/votes/batch`.
async fn handle_get_batch_votes(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<BatchVotesRequest>,
) -> Result<Json<BatchVotesResponse>, HttpError> {
    let response: BatchVotesResponse =
        get_batch_votes(&app_state.store, &app_state.config, req).await?;
    Ok(Json(response))
}

/// Handler for POST `/votes/{article_id}/cast`.
///
/// Requires a bearer identity. Anonymous callers get 401 and nothing is written.
async fn handle_cast_vote(
    AxumState(app_state): AxumState<AppState>,
    RequestSession(session): RequestSession,
    Path(article_id): Path<String>,
    Json(req): Json<CastVoteRequest>,
) -> Result<Json<CastVoteResponse>, HttpError> {
    info!(
        article_id = %article_id,
        user_id = ?session.user().map(UserId::as_str),
        vote = %req.vote,
        "Handling cast_vote request"
    );

    let article_id: ArticleId = parse_article_id(&article_id)?;
    let response: CastVoteResponse = cast_vote(
        &app_state.store,
        &session,
        &article_id,
        req,
        request_cause("Vote cast via HTTP"),
    )
    .await?;

    Ok(Json(response))
}

/// Handler for GET `/votes/{article_id}/users/{user_id}`.
async fn handle_get_user_vote(
    AxumState(app_state): AxumState<AppState>,
    Path((article_id, user_id)): Path<(String, String)>,
) -> Result<Json<UserVoteResponse>, HttpError> {
    let article_id: ArticleId = parse_article_id(&article_id)?;
    let user_id: UserId = parse_user_id(&user_id)?;
    let response: UserVoteResponse = get_user_vote(&app_state.store, &article_id, &user_id).await?;
    Ok(Json(response))
}

/// Handler for GET `/votes/{article_id}/ledger`.
async fn handle_get_article_ledger(
    AxumState(app_state): AxumState<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<LedgerResponse>, HttpError> {
    let scope: LedgerScope = LedgerScope::Article(parse_article_id(&article_id)?);
    let response: LedgerResponse = get_vote_ledger(&app_state.store, &scope).await?;
    Ok(Json(response))
}

/// Handler for GET `/users/{user_id}/ledger`.
async fn handle_get_user_ledger(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LedgerResponse>, HttpError> {
    let scope: LedgerScope = LedgerScope::User(parse_user_id(&user_id)?);
    let response: LedgerResponse = get_vote_ledger(&app_state.store, &scope).await?;
    Ok(Json(response))
}

/// Handler for POST `/maintenance/reconcile/{article_id}`.
async fn handle_reconcile(
    AxumState(app_state): AxumState<AppState>,
    RequestSession(session): RequestSession,
    Path(article_id): Path<String>,
) -> Result<Json<ReconcileResponse>, HttpError> {
    info!(article_id = %article_id, "Handling reconcile request");

    let article_id: ArticleId = parse_article_id(&article_id)?;
    let response: ReconcileResponse = reconcile_votes(
        &app_state.store,
        &session,
        &article_id,
        request_cause("Reconciliation via HTTP"),
    )
    .await?;

    Ok(Json(response))
}

/// Handler for GET `/maintenance/inconsistent`.
async fn handle_find_inconsistent(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<InconsistentArticlesResponse>, HttpError> {
    let response: InconsistentArticlesResponse =
        find_inconsistent_articles(&app_state.store).await?;
    Ok(Json(response))
}

/// Handler for POST `/articles/id`.
async fn handle_derive_article_id(
    Json(req): Json<DeriveArticleIdRequest>,
) -> Result<Json<DeriveArticleIdResponse>, HttpError> {
    Ok(Json(derive_article_id(&req)?))
}

/// Handler for POST `/articles/rank`.
async fn handle_rank_articles(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RankArticlesRequest>,
) -> Result<Json<RankArticlesResponse>, HttpError> {
    let response: RankArticlesResponse = rank_articles(
        &app_state.store,
        &app_state.config,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/votes/batch", post(handle_get_batch_votes))
        .route("/votes/{article_id}", get(handle_get_votes))
        .route("/votes/{article_id}/cast", post(handle_cast_vote))
        .route(
            "/votes/{article_id}/users/{user_id}",
            get(handle_get_user_vote),
        )
        .route("/votes/{article_id}/ledger", get(handle_get_article_ledger))
        .route("/users/{user_id}/ledger", get(handle_get_user_ledger))
        .route(
            "/maintenance/reconcile/{article_id}",
            post(handle_reconcile),
        )
        .route("/maintenance/inconsistent", get(handle_find_inconsistent))
        .route("/articles/id", post(handle_derive_article_id))
        .route("/articles/rank", post(handle_rank_articles))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing news vote server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file_and_options(
            db_path,
            PersistenceOptions {
                busy_timeout: Duration::from_millis(args.busy_timeout_ms),
            },
        )?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let config: VoteConfig = args.vote_config();
    let app_state: AppState = AppState {
        store: SqliteVoteStore::new(persistence, &config),
        config,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
