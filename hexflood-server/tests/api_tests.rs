//! Integration tests for hexflood-server API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use hexflood_core::{generate, GameConfig, Palette};
use hexflood_server::{create_router, ServerConfig, ServerState};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let config = ServerConfig::default();
    let state = Arc::new(ServerState::new(config.game.clone()));
    create_router(&config, state)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_status_endpoint() {
    let (status, json) = get_json(test_app(), "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], "rust");
    assert_eq!(json["games"], 0);
    assert_eq!(json["challenges"], 0);
}

#[tokio::test]
async fn test_status_counts_relay_activity() {
    let config = ServerConfig::default();
    let state = Arc::new(ServerState::with_seed(GameConfig::new(6, 0), Some(5)));
    let app = create_router(&config, state.clone());

    let (host_tx, _host_rx) = unbounded_channel();
    let host = state.relay.connect(host_tx);
    let code = state.relay.create_challenge(host, "Ann").unwrap();

    let (_, json) = get_json(app.clone(), "/api/status").await;
    assert_eq!(json["challenges"], 1);
    assert_eq!(json["games"], 0);

    let (guest_tx, _guest_rx) = unbounded_channel();
    let guest = state.relay.connect(guest_tx);
    state.relay.join_challenge(guest, &code, "Bo").unwrap();

    let (_, json) = get_json(app, "/api/status").await;
    assert_eq!(json["challenges"], 0);
    assert_eq!(json["games"], 1);
}

#[tokio::test]
async fn test_board_endpoint_defaults() {
    let (status, json) = get_json(test_app(), "/api/board").await;

    assert_eq!(status, StatusCode::OK);
    let size = json["size"].as_u64().unwrap() as usize;
    assert_eq!(size, GameConfig::default().size);
    assert_eq!(json["tiles"].as_array().unwrap().len(), size * size);
    assert_eq!(json["palette"].as_array().unwrap().len(), 6);
    assert_eq!(json["directions"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_board_endpoint_matches_generator() {
    let (status, json) = get_json(test_app(), "/api/board?size=5&seed=42&colors=4").await;
    assert_eq!(status, StatusCode::OK);

    let expected = generate(5, 42, &Palette::with_size(4).unwrap()).unwrap();
    let tiles = json["tiles"].as_array().unwrap();
    assert_eq!(tiles.len(), 25);
    for (tile, want) in tiles.iter().zip(expected.tiles()) {
        assert_eq!(tile["hex"]["q"], want.hex.q);
        assert_eq!(tile["hex"]["r"], want.hex.r);
        assert_eq!(tile["color"], want.color.0);
    }
    assert_eq!(tiles[4]["owner"], "one");
    assert_eq!(tiles[20]["owner"], "two");
}

#[tokio::test]
async fn test_board_endpoint_rejects_bad_config() {
    let (status, json) = get_json(test_app(), "/api/board?size=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("at least 2"));

    let (status, _) = get_json(test_app(), "/api/board?colors=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_board_endpoint_rejects_oversized_requests() {
    let (status, json) = get_json(test_app(), "/api/board?size=100000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("at most 256"));

    let (status, _) = get_json(test_app(), "/api/board?colors=1000000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(test_app(), "/api/board?size=256&colors=2").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let (status, _) = get_json(test_app(), "/api/ws").await;
    assert_ne!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_falls_through_to_static() {
    let (status, _) = get_json(test_app(), "/no/such/file.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
