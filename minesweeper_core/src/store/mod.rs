pub mod memory;
pub mod postgres;

use crate::board::Board;
use crate::compose::Operation;
use crate::error::Result;
use crate::types::{Caller, Game};

#[derive(Debug, PartialEq, Eq)]
pub enum Append {
  Appended,
  /// Another operation committed under the same (game, sequence id) pair.
  SequenceConflict,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Commit {
  Committed,
  SequenceConflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
  pub rows: i32,
  pub cols: i32,
  pub mines: i32,
  pub creator_id: i32,
  pub private: bool,
}

/// Durable state the apply engine runs against: the per-game board cells and
/// the append-only operation log, unique on (game_id, sequence_id).
///
/// Game lookups are visibility-scoped: a private game owned by someone else
/// behaves exactly like a missing one. A sequence conflict is reported as a
/// value, not an error, so the engine's retry is an ordinary match arm.
pub trait Store {
  type Tx;

  async fn insert_game(&self, game: &NewGame, board: &Board) -> Result<i32>;
  async fn find_game(&self, caller: &Caller, game_id: i32) -> Result<Option<Game>>;
  async fn find_games(&self, caller: &Caller) -> Result<Vec<Game>>;
  /// Committed operations with `sequence_id >= baseline`, ascending.
  async fn operations_since(&self, game_id: i32, baseline: i64) -> Result<Vec<Operation>>;
  async fn read_cell(&self, game_id: i32, row: i32, col: i32) -> Result<i32>;
  async fn read_board(&self, game_id: i32) -> Result<Vec<Vec<i32>>>;

  async fn begin(&self) -> Result<Self::Tx>;
  async fn update_cell(&self, tx: &mut Self::Tx, game_id: i32, row: i32, col: i32, value: i32) -> Result<()>;
  async fn append_operation(&self, tx: &mut Self::Tx, game_id: i32, operation: &Operation) -> Result<Append>;
  /// Full board as seen from inside the transaction, staged writes included.
  async fn scan_board(&self, tx: &mut Self::Tx, game_id: i32) -> Result<Vec<Vec<i32>>>;
  async fn finish_game(&self, tx: &mut Self::Tx, game_id: i32, won: bool) -> Result<()>;
  async fn commit(&self, tx: Self::Tx) -> Result<Commit>;
  async fn rollback(&self, tx: Self::Tx) -> Result<()>;
}
