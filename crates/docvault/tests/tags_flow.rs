//! Tag catalog: term filtering, load-once semantics, and fail-closed
//! behavior on transport errors.

mod common;

use axum::extract::State;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docvault::{ApiClient, ApiError, TagCatalog};

fn tags_app(hits: Arc<AtomicUsize>, response: Value) -> Router {
    Router::new()
        .route(
            "/documentTags",
            post(
                move |State(hits): State<Arc<AtomicUsize>>, Json(_body): Json<Value>| {
                    let response = response.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(response)
                    }
                },
            ),
        )
        .with_state(hits)
}

#[tokio::test]
async fn fetch_tags_returns_the_catalog() {
    common::init_test_logging();

    let hits = Arc::new(AtomicUsize::new(0));
    let response = json!({"status": true, "data": [
        {"id": "1", "label": "invoice"},
        {"id": "2", "label": "contract"}
    ]});
    let base = common::serve(tags_app(hits.clone(), response)).await;
    let client = ApiClient::new(&common::test_config(&base)).expect("client");

    let tags = client.fetch_tags("t1", "").await.expect("tags");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].label, "invoice");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn catalog_loads_at_most_once() {
    common::init_test_logging();

    let hits = Arc::new(AtomicUsize::new(0));
    let response = json!({"status": true, "data": [{"id": "1", "label": "invoice"}]});
    let base = common::serve(tags_app(hits.clone(), response)).await;
    let client = ApiClient::new(&common::test_config(&base)).expect("client");

    let mut catalog = TagCatalog::new();
    assert_eq!(catalog.ensure_loaded(&client, "t1").await.len(), 1);
    // a second call, even with a different token, reuses the snapshot
    assert_eq!(catalog.ensure_loaded(&client, "t2").await.len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(catalog.find_by_label("invoice").is_some());
    assert!(catalog.find_by_label("missing").is_none());
}

#[tokio::test]
async fn catalog_fails_closed_on_transport_error() {
    common::init_test_logging();

    let client = ApiClient::new(&common::test_config(&common::dead_base_url())).expect("client");
    let mut catalog = TagCatalog::new();
    assert!(catalog.ensure_loaded(&client, "t1").await.is_empty());
    // the failed load still counts as the one load
    assert!(catalog.options().is_empty());
}

#[tokio::test]
async fn non_list_catalog_is_an_unexpected_shape() {
    common::init_test_logging();

    let hits = Arc::new(AtomicUsize::new(0));
    let base = common::serve(tags_app(
        hits,
        json!({"status": true, "data": {"not": "a list"}}),
    ))
    .await;
    let client = ApiClient::new(&common::test_config(&base)).expect("client");

    let err = client.fetch_tags("t1", "").await.expect_err("bad shape");
    assert!(matches!(err, ApiError::UnexpectedShape(_)));
}
