use minesweeper_core::types::{
  ApplyOperationRequest, Board, Caller, Games, MemoryStore, NewGame, OperationKind, Result, Store,
};

#[derive(Debug)]
pub struct TestSetup {
  pub games: Games<MemoryStore>,
  pub store: MemoryStore,
  pub creator: Caller,
  pub game_id: i32,
}

pub fn caller(id: i32, display_name: &str) -> Caller {
  Caller {
    id,
    display_name: display_name.to_string(),
  }
}

/// Seeds a game with a fixed mine layout straight through the store, so
/// scenarios can target known cells.
pub async fn setup_with_board(rows: i32, cols: i32, mines: &[(i32, i32)], private: bool) -> Result<TestSetup> {
  let store = MemoryStore::new();
  let board = Board::with_mines(rows, cols, mines)?;
  let creator = caller(1, "creator");

  let game_id = store
    .insert_game(
      &NewGame {
        rows,
        cols,
        mines: mines.len() as i32,
        creator_id: creator.id,
        private,
      },
      &board,
    )
    .await?;

  let games = Games::try_new(store.clone()).await?;

  Ok(TestSetup {
    games,
    store,
    creator,
    game_id,
  })
}

/// The 3x3 board used by most scenarios, mines at (0, 1) and (2, 2):
///
///    -2 -10  -2
///    -2  -3  -3
///    -1  -2 -10
pub async fn setup_three_by_three() -> Result<TestSetup> {
  setup_with_board(3, 3, &[(0, 1), (2, 2)], false).await
}

pub fn reveal(game_id: i32, row: i32, col: i32, sequence_id: i64) -> ApplyOperationRequest {
  ApplyOperationRequest {
    game_id,
    row,
    col,
    kind: OperationKind::Reveal,
    sequence_id,
    timeout: None,
  }
}

pub fn mark(game_id: i32, row: i32, col: i32, sequence_id: i64) -> ApplyOperationRequest {
  ApplyOperationRequest {
    game_id,
    row,
    col,
    kind: OperationKind::Mark,
    sequence_id,
    timeout: None,
  }
}
