use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::Board;
use crate::error::Result;
use crate::store::{NewGame, Store};
use crate::types::Caller;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
  pub rows: i32,
  pub cols: i32,
  pub mines: i32,
  pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGameResponse {
  pub game_id: i32,
}

/// Generates a fresh board and persists the game together with every board
/// point in one transaction.
pub async fn try_create_game<S: Store>(
  store: &S,
  caller: &Caller,
  request: CreateGameRequest,
) -> Result<CreateGameResponse> {
  let board = Board::generate(request.rows, request.cols, request.mines)?;

  let game_id = store
    .insert_game(
      &NewGame {
        rows: request.rows,
        cols: request.cols,
        mines: request.mines,
        creator_id: caller.id,
        private: request.private,
      },
      &board,
    )
    .await?;

  info!(
    game_id,
    rows = request.rows,
    cols = request.cols,
    mines = request.mines,
    "created game"
  );

  Ok(CreateGameResponse { game_id })
}
