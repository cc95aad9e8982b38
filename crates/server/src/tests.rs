// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let config: VoteConfig = VoteConfig::default();
    AppState {
        store: SqliteVoteStore::new(persistence, &config),
        config,
    }
}

fn article_id(url: &str) -> String {
    ArticleId::derive(Some(url), None).unwrap().to_string()
}

async fn send(app: &Router, request: Request<Body>) -> (HttpStatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {user}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_unvoted_article_returns_zero_record() {
    let app: Router = build_router(create_test_app_state());
    let id: String = article_id("https://news.test/a");

    let (status, body) = send(&app, get(&format!("/votes/{id}"))).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body, json!({"upvotes": 0, "downvotes": 0, "voters": {}}));
}

#[tokio::test]
async fn test_cast_without_identity_is_unauthorized_and_writes_nothing() {
    let app: Router = build_router(create_test_app_state());
    let id: String = article_id("https://news.test/a");

    let (status, body) = send(
        &app,
        post_json(&format!("/votes/{id}/cast"), None, &json!({"vote": "upvote"})),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!(true));

    let (_, record) = send(&app, get(&format!("/votes/{id}"))).await;
    assert_eq!(record["upvotes"], json!(0));

    let (_, ledger) = send(&app, get(&format!("/votes/{id}/ledger"))).await;
    assert_eq!(ledger["entries"], json!([]));
}

#[tokio::test]
async fn test_cast_switch_and_lookup() {
    let app: Router = build_router(create_test_app_state());
    let id: String = article_id("https://news.test/a");

    let (status, body) = send(
        &app,
        post_json(
            &format!("/votes/{id}/cast"),
            Some("alice"),
            &json!({"vote": "upvote"}),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["user_vote"], json!("upvote"));
    assert_eq!(
        body["record"],
        json!({"upvotes": 1, "downvotes": 0, "voters": {"alice": "upvote"}})
    );

    let (status, body) = send(
        &app,
        post_json(
            &format!("/votes/{id}/cast"),
            Some("alice"),
            &json!({"vote": "downvote"}),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(
        body["record"],
        json!({"upvotes": 0, "downvotes": 1, "voters": {"alice": "downvote"}})
    );
    assert_eq!(body["change"], json!("switched upvote -> downvote"));

    let (status, body) = send(&app, get(&format!("/votes/{id}/users/alice"))).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["vote"], json!("downvote"));

    let (_, body) = send(&app, get("/users/alice/ledger")).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["entries"][0]["actor_type"], json!("user"));
}

#[tokio::test]
async fn test_malformed_authorization_header_is_bad_request() {
    let app: Router = build_router(create_test_app_state());
    let id: String = article_id("https://news.test/a");

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri(format!("/votes/{id}/cast"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Token alice")
        .body(Body::from(json!({"vote": "upvote"}).to_string()))
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_vote_kind_and_article_id_are_bad_requests() {
    let app: Router = build_router(create_test_app_state());
    let id: String = article_id("https://news.test/a");

    let (status, _) = send(
        &app,
        post_json(
            &format!("/votes/{id}/cast"),
            Some("alice"),
            &json!({"vote": "meh"}),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/votes/not-an-id")).await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_votes_covers_every_id() {
    let app: Router = build_router(create_test_app_state());
    let voted: String = article_id("https://news.test/voted");
    let fresh: String = article_id("https://news.test/fresh");

    send(
        &app,
        post_json(
            &format!("/votes/{voted}/cast"),
            Some("alice"),
            &json!({"vote": "upvote"}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json(
            "/votes/batch",
            None,
            &json!({"article_ids": [voted, fresh, voted]}),
        ),
    )
    .await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["votes"].as_object().unwrap().len(), 2);
    assert_eq!(body["votes"][&voted]["upvotes"], json!(1));
    assert_eq!(body["votes"][&fresh]["upvotes"], json!(0));
    assert_eq!(body["substituted"], json!([]));
}

#[tokio::test]
async fn test_reconcile_requires_identity() {
    let app: Router = build_router(create_test_app_state());
    let id: String = article_id("https://news.test/a");
    let uri: String = format!("/maintenance/reconcile/{id}");

    let (status, _) = send(&app, post_json(&uri, None, &json!({}))).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, post_json(&uri, Some("ops"), &json!({}))).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["corrected"], json!(false));

    let (status, body) = send(&app, get("/maintenance/inconsistent")).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["article_ids"], json!([]));
}

#[tokio::test]
async fn test_derive_article_id_endpoint() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(
        &app,
        post_json(
            "/articles/id",
            None,
            &json!({"url": "https://news.test/a", "title": "A"}),
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["article_id"], json!(article_id("https://news.test/a")));

    let (status, _) = send(&app, post_json("/articles/id", None, &json!({}))).await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rank_articles_orders_by_votes() {
    let app: Router = build_router(create_test_app_state());
    let liked: String = article_id("https://news.test/liked");

    send(
        &app,
        post_json(
            &format!("/votes/{liked}/cast"),
            Some("alice"),
            &json!({"vote": "upvote"}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json(
            "/articles/rank",
            None,
            &json!({
                "articles": [
                    {"title": "Plain", "url": "https://news.test/plain", "published_at": "2026-03-02T00:00:00Z"},
                    {"title": "Liked", "url": "https://news.test/liked", "published_at": "2026-03-01T00:00:00Z"}
                ],
                "sort": "highest-votes"
            }),
        ),
    )
    .await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["articles"][0]["id"], json!(liked));
    assert_eq!(body["articles"][0]["votes"]["upvotes"], json!(1));
    assert_eq!(body["trending"][0]["id"], json!(liked));
}

#[test]
fn test_api_errors_map_to_status_codes() {
    let cases: Vec<(ApiError, HttpStatusCode)> = vec![
        (
            ApiError::AuthenticationRequired {
                reason: String::from("No user is signed in"),
            },
            HttpStatusCode::UNAUTHORIZED,
        ),
        (
            ApiError::InvalidInput {
                field: String::from("vote"),
                message: String::from("bad"),
            },
            HttpStatusCode::BAD_REQUEST,
        ),
        (
            ApiError::InconsistentState {
                article_id: String::from("abc"),
                message: String::from("drift"),
            },
            HttpStatusCode::CONFLICT,
        ),
        (
            ApiError::Persistence {
                message: String::from("down"),
            },
            HttpStatusCode::SERVICE_UNAVAILABLE,
        ),
    ];

    for (err, expected) in cases {
        let http: HttpError = HttpError::from(err);
        assert_eq!(http.status, expected);
    }
}

#[test]
fn test_args_map_into_vote_config() {
    let args: Args = Args::parse_from([
        "newsvote-server",
        "--cast-timeout-ms",
        "250",
        "--max-batch-size",
        "20",
        "--read-timeout-ms",
        "75",
    ]);

    let config: VoteConfig = args.vote_config();

    assert_eq!(config.cast_timeout, Duration::from_millis(250));
    assert_eq!(config.max_batch_size, 20);
    assert_eq!(config.read_timeout, Duration::from_millis(75));
    assert_eq!(args.port, 3000);
}
