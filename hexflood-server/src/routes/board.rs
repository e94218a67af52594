//! Board generation endpoint
//!
//! Lets clients check that a seed reproduces the same board they were
//! sent.

use crate::state::ServerState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use hexflood_core::{generate, Palette, Tile, DIRECTIONS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Query params; missing values fall back to the server's game settings
#[derive(Deserialize)]
pub struct BoardParams {
    pub size: Option<usize>,
    pub seed: Option<u64>,
    pub colors: Option<usize>,
}

#[derive(Serialize)]
pub struct BoardInfo {
    pub size: usize,
    pub seed: u64,
    pub palette: Palette,
    pub tiles: Vec<Tile>,
    pub directions: Vec<[i32; 2]>,
}

/// Generate a board
pub async fn get_board(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<BoardParams>,
) -> Result<Json<BoardInfo>, (StatusCode, Json<Value>)> {
    let size = params.size.unwrap_or(state.game.size);
    let seed = params.seed.unwrap_or(state.game.seed);
    let palette = match params.colors {
        Some(count) => Palette::with_size(count).map_err(bad_request)?,
        None => state.game.palette.clone(),
    };

    let board = generate(size, seed, &palette).map_err(bad_request)?;

    Ok(Json(BoardInfo {
        size,
        seed,
        palette,
        tiles: board.tiles().cloned().collect(),
        directions: DIRECTIONS.iter().map(|&(q, r)| [q, r]).collect(),
    }))
}

fn bad_request(e: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}
