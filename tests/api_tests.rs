mod common;

use serde_json::{json, Value};
use std::sync::Arc;

use common::{pipeline_with, shop_pipeline, EchoLlm};
use faq_rag::api::{create_router, AppState};
use faq_rag::infrastructure::{AppConfig, Pipeline};

async fn spawn_server(pipeline: Pipeline) -> (String, tokio::task::JoinHandle<()>) {
    let app = create_router(AppState::from(pipeline));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    (format!("http://{}", addr), handle)
}

async fn get(base: &str, path: &str) -> (reqwest::StatusCode, Value) {
    let response = reqwest::get(format!("{base}{path}"))
        .await
        .expect("get response");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn post(base: &str, path: &str, body: Value) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .expect("post response");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_version() {
    let (base, handle) = spawn_server(shop_pipeline().await).await;

    let (status, body) = get(&base, "/health").await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    handle.abort();
}

#[tokio::test]
async fn ready_summarizes_the_index() {
    let (base, handle) = spawn_server(shop_pipeline().await).await;

    let (status, body) = get(&base, "/ready").await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["documents"], 3);
    assert_eq!(body["embedding_model"], "concepts-test");
    handle.abort();
}

#[tokio::test]
async fn chat_answers_with_sources() {
    let (base, handle) = spawn_server(shop_pipeline().await).await;

    let (status, body) = post(
        &base,
        "/api/v1/chat",
        json!({ "message": "How can I get my money back?" }),
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["outcome"], "answered");
    assert!(body["answer"].as_str().unwrap().contains("30 days"));
    assert_eq!(body["sources"][0]["question"], "What is the return policy?");
    handle.abort();
}

#[tokio::test]
async fn chat_with_empty_message_is_not_an_error() {
    let (base, handle) = spawn_server(shop_pipeline().await).await;

    let (status, body) = post(&base, "/api/v1/chat", json!({})).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["outcome"], "empty_query");
    handle.abort();
}

#[tokio::test]
async fn search_returns_ranked_hits() {
    let (base, handle) = spawn_server(shop_pipeline().await).await;

    let (status, body) = post(
        &base,
        "/api/v1/faqs/search",
        json!({ "query": "password login", "limit": 2 }),
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["answer"], "Use the reset link.");
    assert_eq!(hits[0]["category"], "account");
    handle.abort();
}

#[tokio::test]
async fn search_with_zero_limit_is_bad_request() {
    let (base, handle) = spawn_server(shop_pipeline().await).await;

    let (status, _) = post(
        &base,
        "/api/v1/faqs/search",
        json!({ "query": "refund", "limit": 0 }),
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    handle.abort();
}

#[tokio::test]
async fn search_on_empty_store_is_conflict() {
    let pipeline = pipeline_with(
        AppConfig::default(),
        Vec::new(),
        Arc::new(EchoLlm::default()),
    )
    .await;
    let (base, handle) = spawn_server(pipeline).await;

    let (status, _) = post(&base, "/api/v1/faqs/search", json!({ "query": "refund" })).await;

    assert_eq!(status, reqwest::StatusCode::CONFLICT);
    handle.abort();
}
