use serde::{Deserialize, Serialize};

use crate::algebra::Cell;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Caller, DisplayPoint, Game};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveGameRequest {
  pub game_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveGameResponse {
  pub game: Game,
  /// The caller-visible board: marks shown, unrevealed proximities masked.
  pub board: Vec<Vec<DisplayPoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindGamesResponse {
  pub games: Vec<Game>,
}

pub async fn try_retrieve_game<S: Store>(
  store: &S,
  caller: &Caller,
  request: RetrieveGameRequest,
) -> Result<RetrieveGameResponse> {
  let game = store
    .find_game(caller, request.game_id)
    .await?
    .ok_or(Error::GameNotFound {
      game_id: request.game_id,
    })?;

  let raw = store.read_board(game.id).await?;
  let mut board = Vec::with_capacity(raw.len());
  for (row, cells) in raw.into_iter().enumerate() {
    let mut displayed = Vec::with_capacity(cells.len());
    for (col, value) in cells.into_iter().enumerate() {
      displayed.push(DisplayPoint::of(row as i32, col as i32, Cell::from_raw(value)?));
    }
    board.push(displayed);
  }

  Ok(RetrieveGameResponse { game, board })
}

pub async fn try_find_games<S: Store>(store: &S, caller: &Caller) -> Result<FindGamesResponse> {
  let games = store.find_games(caller).await?;
  Ok(FindGamesResponse { games })
}
