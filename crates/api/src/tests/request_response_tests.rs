// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use newsvote_domain::{Article, ArticleId, VoteKind, VoteRecord};
use serde_json::{Value, json};
use time::macros::datetime;

use super::helpers::{article, user};
use crate::request_response::{BatchVotesResponse, RankArticlesRequest, RankedArticle};

#[test]
fn test_batch_response_is_keyed_by_article_id() {
    let id: ArticleId = article("https://news.test/a");
    let record: VoteRecord =
        VoteRecord::from_parts(1, 0, BTreeMap::from([(user("alice"), VoteKind::Upvote)]));
    let response: BatchVotesResponse = BatchVotesResponse {
        votes: BTreeMap::from([(id.clone(), record)]),
        substituted: Vec::new(),
    };

    let value: Value = serde_json::to_value(&response).unwrap();

    assert_eq!(
        value,
        json!({
            "votes": {
                id.as_str(): {"upvotes": 1, "downvotes": 0, "voters": {"alice": "upvote"}}
            },
            "substituted": []
        })
    );
}

#[test]
fn test_ranked_article_flattens_the_article() {
    let ranked: RankedArticle = RankedArticle {
        article: Article::new(
            String::from("Headline"),
            None,
            datetime!(2026-03-01 09:30 UTC),
        )
        .unwrap(),
        votes: VoteRecord::zero(),
    };

    let value: Value = serde_json::to_value(&ranked).unwrap();

    assert_eq!(value["title"], json!("Headline"));
    assert_eq!(value["url"], Value::Null);
    assert_eq!(value["published_at"], json!("2026-03-01T09:30:00Z"));
    assert_eq!(value["votes"]["upvotes"], json!(0));
}

#[test]
fn test_rank_request_defaults_sort_and_range() {
    let request: RankArticlesRequest = serde_json::from_value(json!({
        "articles": [{"title": "Only a title", "published_at": "2026-03-01T00:00:00Z"}]
    }))
    .unwrap();

    assert_eq!(request.sort, None);
    assert_eq!(request.range, None);
    assert_eq!(request.articles[0].url, None);
}
