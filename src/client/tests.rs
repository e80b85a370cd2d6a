use std::sync::Arc;

use hyper::StatusCode;
use serde_json::json;

use crate::api::{
    AllArticles, AllCategories, ArticleBySlug, ArticlesByCategory, CreateArticle, SiteInfo,
};
use super::{
    testing::{article_json, FakeServer},
    ClientError, FetchPolicy,
};


fn create_article() -> CreateArticle {
    CreateArticle {
        user_id: "u1".into(),
        category_id: "c1".into(),
        title: "T".into(),
        content: "C".into(),
        is_published: true,
        is_featured: false,
    }
}

#[tokio::test]
async fn cache_first_hits_network_once() {
    let server = FakeServer::new();
    server.answer_data("AllArticles", "allArticles", json!([article_json("a", true, false)]));
    let client = server.client(FetchPolicy::CacheFirst);

    let first = client.execute(&AllArticles {}).await.unwrap();
    let second = client.execute(&AllArticles {}).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].slug, "a");
    assert_eq!(server.count("AllArticles"), 1);
}

#[tokio::test]
async fn network_only_always_asks_server() {
    let server = FakeServer::new();
    server.answer_data("SiteInfo", "site", json!({ "name": "Daily Bugle" }));
    let client = server.client(FetchPolicy::NetworkOnly);

    for _ in 0..3 {
        let site = client.execute(&SiteInfo {}).await.unwrap();
        assert_eq!(site.unwrap().name, "Daily Bugle");
    }
    assert_eq!(server.count("SiteInfo"), 3);
}

#[tokio::test]
async fn memoization_distinguishes_variables() {
    let server = FakeServer::new();
    server.answer_data("ArticlesByCategory", "articlesByCategory", json!([]));
    let client = server.client(FetchPolicy::CacheFirst);

    for category in ["sports", "politics", "sports"] {
        let op = ArticlesByCategory { category: category.into() };
        client.execute(&op).await.unwrap();
    }
    assert_eq!(server.count("ArticlesByCategory"), 2);

    let requests = server.requests();
    assert_eq!(requests[0]["variables"], json!({ "category": "sports" }));
    assert_eq!(requests[1]["variables"], json!({ "category": "politics" }));
}

#[tokio::test]
async fn article_by_slug_is_served_from_normalized_records() {
    let server = FakeServer::new();
    server.answer_data("AllArticles", "allArticles", json!([
        article_json("first", true, false),
        article_json("second", true, true),
    ]));
    server.answer_data("ArticleBySlug", "articleBySlug", json!(null));
    let client = server.client(FetchPolicy::CacheFirst);

    client.execute(&AllArticles {}).await.unwrap();
    let article = client.execute(&ArticleBySlug { slug: "second".into() }).await.unwrap();
    assert_eq!(article.unwrap().title, "Title of second");
    assert_eq!(server.count("ArticleBySlug"), 0);

    // Unknown slugs still go to the server, which returns `null`.
    let missing = client.execute(&ArticleBySlug { slug: "nope".into() }).await.unwrap();
    assert_eq!(missing, None);
    assert_eq!(server.count("ArticleBySlug"), 1);
}

#[tokio::test]
async fn memoized_null_does_not_hide_created_article() {
    let server = FakeServer::new();
    server.answer_data("ArticleBySlug", "articleBySlug", json!(null));
    server.answer_data("ArticleBySlug", "articleBySlug", article_json("fresh", true, false));
    server.answer_data("CreateArticle", "createArticle", json!({ "article": { "title": "T" } }));
    server.answer_data("AllArticles", "allArticles", json!([article_json("fresh", true, false)]));
    let client = server.client(FetchPolicy::CacheFirst);
    let op = ArticleBySlug { slug: "fresh".into() };

    assert_eq!(client.execute(&op).await.unwrap(), None);
    assert_eq!(client.execute(&op).await.unwrap(), None);
    assert_eq!(server.count("ArticleBySlug"), 1);

    // Creating an article evicts the memoized `null`.
    client.execute(&create_article()).await.unwrap();
    let article = client.execute(&op).await.unwrap();
    assert_eq!(article.unwrap().title, "Title of fresh");
    assert_eq!(server.count("ArticleBySlug"), 2);

    // And a list containing the article answers it from then on.
    client.execute(&create_article()).await.unwrap();
    client.execute(&AllArticles {}).await.unwrap();
    assert!(client.execute(&op).await.unwrap().is_some());
    assert_eq!(server.count("ArticleBySlug"), 2);
}

#[tokio::test]
async fn newer_normalized_article_wins_over_memoized_one() {
    let server = FakeServer::new();
    let mut old = article_json("a", true, false);
    old["title"] = json!("old");
    let mut new = article_json("a", true, false);
    new["title"] = json!("new");
    server.answer_data("ArticleBySlug", "articleBySlug", old);
    server.answer_data("AllArticles", "allArticles", json!([new]));
    let client = server.client(FetchPolicy::CacheFirst);
    let op = ArticleBySlug { slug: "a".into() };

    assert_eq!(client.execute(&op).await.unwrap().unwrap().title, "old");
    client.execute_with(&AllArticles {}, FetchPolicy::NetworkOnly).await.unwrap();
    assert_eq!(client.execute(&op).await.unwrap().unwrap().title, "new");
    assert_eq!(server.count("ArticleBySlug"), 1);
}

#[tokio::test]
async fn categories_are_readable_by_id() {
    let server = FakeServer::new();
    server.answer_data("AllCategories", "allCategories", json!([
        { "id": 1, "name": "Sports", "slug": "sports" },
    ]));
    let client = server.client(FetchPolicy::CacheFirst);

    assert_eq!(client.cached_category(&"1".into()).await, None);
    client.execute(&AllCategories {}).await.unwrap();
    assert_eq!(client.cached_category(&"1".into()).await.unwrap().name, "Sports");
    assert_eq!(client.cached_category(&"2".into()).await, None);
    assert_eq!(server.count("AllCategories"), 1);
}

#[tokio::test]
async fn mutation_bypasses_cache_and_evicts_article_lists() {
    let server = FakeServer::new();
    server.answer_data("AllArticles", "allArticles", json!([article_json("a", true, false)]));
    server.answer_data("AllCategories", "allCategories", json!([
        { "id": "1", "name": "Sports", "slug": "sports" },
    ]));
    server.answer_data("CreateArticle", "createArticle", json!({ "article": { "title": "T" } }));
    let client = server.client(FetchPolicy::CacheFirst);

    client.execute(&AllArticles {}).await.unwrap();
    client.execute(&AllCategories {}).await.unwrap();

    for _ in 0..2 {
        let payload = client.execute(&create_article()).await.unwrap();
        assert_eq!(payload.article.unwrap().title, "T");
    }
    assert_eq!(server.count("CreateArticle"), 2);

    client.execute(&AllArticles {}).await.unwrap();
    client.execute(&AllCategories {}).await.unwrap();
    assert_eq!(server.count("AllArticles"), 2);
    assert_eq!(server.count("AllCategories"), 1);
}

#[tokio::test]
async fn invalid_input_is_not_sent() {
    let server = FakeServer::new();
    let client = server.client(FetchPolicy::CacheFirst);

    let err = client.execute(&ArticlesByCategory { category: "".into() }).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(_)), "{err}");

    let op = CreateArticle { category_id: "".into(), ..create_article() };
    let err = client.execute(&op).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(_)), "{err}");
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn record_missing_a_field_is_contract_violation() {
    let server = FakeServer::new();
    let mut incomplete = article_json("b", true, false);
    incomplete.as_object_mut().unwrap().remove("userId");
    server.answer_data("AllArticles", "allArticles", json!([article_json("a", true, false), incomplete]));
    let client = server.client(FetchPolicy::CacheFirst);

    let err = client.execute(&AllArticles {}).await.unwrap_err();
    match err {
        ClientError::ContractViolation { operation, msg } => {
            assert_eq!(operation, "AllArticles");
            assert!(msg.contains("userId"), "{msg}");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Nothing of the broken response ends up in the cache.
    assert_eq!(client.cache().memoized_queries(), 0);
    assert_eq!(client.cache().normalized_records(), 0);
}

#[tokio::test]
async fn graphql_errors_are_reported() {
    let server = FakeServer::new();
    server.answer_raw("ArticleBySlug", StatusCode::OK, json!({
        "data": { "articleBySlug": null },
        "errors": [{ "message": "Article matching query does not exist.", "path": ["articleBySlug"] }],
    }));
    server.answer_raw("CreateArticle", StatusCode::BAD_REQUEST, json!({
        "errors": [{ "message": "Unknown argument \"categoryID\" on field \"createArticle\"." }],
    }));
    let client = server.client(FetchPolicy::CacheFirst);

    let err = client.execute(&ArticleBySlug { slug: "x".into() }).await.unwrap_err();
    match &err {
        ClientError::GraphQl(errors) => assert_eq!(errors.len(), 1),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("(at 'articleBySlug')"));

    let err = client.execute(&create_article()).await.unwrap_err();
    assert!(err.to_string().contains("Unknown argument"), "{err}");
}

#[tokio::test]
async fn http_errors_without_graphql_body() {
    let server = FakeServer::new();
    server.answer_raw("SiteInfo", StatusCode::BAD_GATEWAY, json!("upstream down"));
    let client = server.client(FetchPolicy::CacheFirst);

    let err = client.execute(&SiteInfo {}).await.unwrap_err();
    match err {
        ClientError::Http { status, .. } => assert_eq!(status, StatusCode::BAD_GATEWAY),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_root_field_is_contract_violation() {
    let server = FakeServer::new();
    server.answer_raw("SiteInfo", StatusCode::OK, json!({ "data": { "somethingElse": 1 } }));
    let client = Arc::new(server.client(FetchPolicy::CacheFirst));

    let err = client.execute(&SiteInfo {}).await.unwrap_err();
    assert!(matches!(err, ClientError::ContractViolation { operation: "SiteInfo", .. }), "{err}");
}
