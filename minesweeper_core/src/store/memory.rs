use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::board::Board;
use crate::compose::Operation;
use crate::error::{Error, Result};
use crate::store::{Append, Commit, NewGame, Store};
use crate::types::{Caller, Game};

#[derive(Debug, Default)]
struct Tables {
  next_game_id: i32,
  games: HashMap<i32, Game>,
  boards: HashMap<i32, Vec<Vec<i32>>>,
  operations: HashMap<i32, Vec<Operation>>,
}

/// In-memory rendition of the Postgres store: one mutex around the tables,
/// transactions staging their writes until commit.
///
/// Commit re-checks the (game_id, sequence_id) uniqueness against the
/// committed log, and `force_sequence_conflicts` makes the next commits
/// report a conflict regardless, so tests can exercise the engine's retry
/// path deterministically.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
  forced_conflicts: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
pub struct MemoryTx {
  cells: Vec<(i32, i32, i32, i32)>,
  operations: Vec<(i32, Operation)>,
  finished: Option<(i32, bool)>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn force_sequence_conflicts(&self, count: usize) {
    self.forced_conflicts.store(count, Ordering::SeqCst);
  }

  fn tables(&self) -> MutexGuard<'_, Tables> {
    self.tables.lock().expect("store mutex poisoned")
  }
}

fn sequence_taken(operations: &HashMap<i32, Vec<Operation>>, game_id: i32, sequence_id: i64) -> bool {
  operations
    .get(&game_id)
    .is_some_and(|log| log.iter().any(|operation| operation.sequence_id == sequence_id))
}

impl Store for MemoryStore {
  type Tx = MemoryTx;

  async fn insert_game(&self, game: &NewGame, board: &Board) -> Result<i32> {
    let mut tables = self.tables();
    tables.next_game_id += 1;
    let id = tables.next_game_id;
    tables.games.insert(
      id,
      Game {
        id,
        rows: game.rows,
        cols: game.cols,
        mines: game.mines,
        creator_id: game.creator_id,
        private: game.private,
        won: false,
        lost: false,
        finished_at: None,
        created_at: Utc::now(),
      },
    );
    tables.boards.insert(id, board.raw_rows());
    tables.operations.insert(id, Vec::new());
    Ok(id)
  }

  async fn find_game(&self, caller: &Caller, game_id: i32) -> Result<Option<Game>> {
    Ok(
      self
        .tables()
        .games
        .get(&game_id)
        .filter(|game| game.visible_to(caller))
        .cloned(),
    )
  }

  async fn find_games(&self, caller: &Caller) -> Result<Vec<Game>> {
    let tables = self.tables();
    let mut games: Vec<Game> = tables
      .games
      .values()
      .filter(|game| game.visible_to(caller))
      .cloned()
      .collect();
    games.sort_by_key(|game| game.id);
    Ok(games)
  }

  async fn operations_since(&self, game_id: i32, baseline: i64) -> Result<Vec<Operation>> {
    Ok(
      self
        .tables()
        .operations
        .get(&game_id)
        .map(|log| {
          log
            .iter()
            .filter(|operation| operation.sequence_id >= baseline)
            .copied()
            .collect()
        })
        .unwrap_or_default(),
    )
  }

  async fn read_cell(&self, game_id: i32, row: i32, col: i32) -> Result<i32> {
    self
      .tables()
      .boards
      .get(&game_id)
      .and_then(|board| board.get(row as usize))
      .and_then(|cells| cells.get(col as usize))
      .copied()
      .ok_or(Error::InvalidPosition { row, col })
  }

  async fn read_board(&self, game_id: i32) -> Result<Vec<Vec<i32>>> {
    self
      .tables()
      .boards
      .get(&game_id)
      .cloned()
      .ok_or(Error::GameNotFound { game_id })
  }

  async fn begin(&self) -> Result<Self::Tx> {
    Ok(MemoryTx::default())
  }

  async fn update_cell(&self, tx: &mut Self::Tx, game_id: i32, row: i32, col: i32, value: i32) -> Result<()> {
    tx.cells.push((game_id, row, col, value));
    Ok(())
  }

  async fn append_operation(&self, tx: &mut Self::Tx, game_id: i32, operation: &Operation) -> Result<Append> {
    if sequence_taken(&self.tables().operations, game_id, operation.sequence_id) {
      return Ok(Append::SequenceConflict);
    }
    tx.operations.push((game_id, *operation));
    Ok(Append::Appended)
  }

  async fn scan_board(&self, tx: &mut Self::Tx, game_id: i32) -> Result<Vec<Vec<i32>>> {
    let mut board = self
      .tables()
      .boards
      .get(&game_id)
      .cloned()
      .ok_or(Error::GameNotFound { game_id })?;
    for &(staged_game, row, col, value) in &tx.cells {
      if staged_game == game_id {
        board[row as usize][col as usize] = value;
      }
    }
    Ok(board)
  }

  async fn finish_game(&self, tx: &mut Self::Tx, game_id: i32, won: bool) -> Result<()> {
    tx.finished = Some((game_id, won));
    Ok(())
  }

  async fn commit(&self, tx: Self::Tx) -> Result<Commit> {
    let mut tables = self.tables();

    if self.forced_conflicts.load(Ordering::SeqCst) > 0 {
      self.forced_conflicts.fetch_sub(1, Ordering::SeqCst);
      return Ok(Commit::SequenceConflict);
    }
    for (game_id, operation) in &tx.operations {
      if sequence_taken(&tables.operations, *game_id, operation.sequence_id) {
        return Ok(Commit::SequenceConflict);
      }
    }

    for (game_id, row, col, value) in tx.cells {
      let cell = tables
        .boards
        .get_mut(&game_id)
        .and_then(|board| board.get_mut(row as usize))
        .and_then(|cells| cells.get_mut(col as usize))
        .ok_or(Error::InvalidPosition { row, col })?;
      *cell = value;
    }
    for (game_id, operation) in tx.operations {
      let log = tables.operations.entry(game_id).or_default();
      log.push(operation);
      log.sort_by_key(|operation| operation.sequence_id);
    }
    if let Some((game_id, won)) = tx.finished {
      let game = tables
        .games
        .get_mut(&game_id)
        .ok_or(Error::GameNotFound { game_id })?;
      game.won = won;
      game.lost = !won;
      game.finished_at = Some(Utc::now());
    }

    Ok(Commit::Committed)
  }

  async fn rollback(&self, _tx: Self::Tx) -> Result<()> {
    Ok(())
  }
}
