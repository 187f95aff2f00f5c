use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

pub use crate::algebra::{Cell, MarkTier, OperationKind};
pub use crate::board::Board;
pub use crate::commands::{ApplyOperationRequest, ConfirmedOperation, OperationConfirmation};
pub use crate::commands::{CreateGameRequest, CreateGameResponse};
pub use crate::commands::{FindGamesResponse, RetrieveGameRequest, RetrieveGameResponse};
pub use crate::compose::{compose, compose_against_log, CompositionResult, LogComposition, Operation};
pub use crate::error::{Error, Result};
pub use crate::games::Games;
pub use crate::store::memory::MemoryStore;
pub use crate::store::postgres::PgStore;
pub use crate::store::{Append, Commit, NewGame, Store};

pub use sqlx::types::Json;
pub use sqlx::PgPool;
pub type DateTimeUtc = DateTime<Utc>;

/// Identity of the authenticated caller, established by the surrounding
/// service; the engine only uses it for visibility checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caller {
  pub id: i32,
  pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
  pub id: i32,
  pub rows: i32,
  pub cols: i32,
  pub mines: i32,
  pub creator_id: i32,
  pub private: bool,
  pub won: bool,
  pub lost: bool,
  pub finished_at: Option<DateTimeUtc>,
  pub created_at: DateTimeUtc,
}

impl Game {
  pub fn finished(&self) -> bool {
    self.won || self.lost
  }

  pub fn in_bounds(&self, row: i32, col: i32) -> bool {
    (0..self.rows).contains(&row) && (0..self.cols).contains(&col)
  }

  pub fn visible_to(&self, caller: &Caller) -> bool {
    !self.private || self.creator_id == caller.id
  }
}

/// Player-facing state of a single cell. Proximity stays hidden unless the
/// cell is revealed.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, IntoStaticStr)]
pub enum PointState {
  NotRevealed,
  SuspectMine,
  MarkedMine,
  Revealed,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct DisplayPoint {
  pub row: i32,
  pub col: i32,
  pub state: PointState,
  pub proximity: Option<u8>,
}

impl DisplayPoint {
  pub fn of(row: i32, col: i32, cell: Cell) -> Self {
    let (state, proximity) = match cell {
      Cell::Hidden {
        mark: MarkTier::Unmarked,
        ..
      } => (PointState::NotRevealed, None),
      Cell::Hidden {
        mark: MarkTier::Suspect,
        ..
      } => (PointState::SuspectMine, None),
      Cell::Hidden {
        mark: MarkTier::Certain,
        ..
      } => (PointState::MarkedMine, None),
      Cell::Revealed { proximity } => (PointState::Revealed, Some(proximity)),
      Cell::RevealedMine => (PointState::Revealed, Some(9)),
    };
    Self {
      row,
      col,
      state,
      proximity,
    }
  }
}

/// Game status carried on every operation confirmation; the full board is
/// attached once the game has concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
  pub won: bool,
  pub lost: bool,
  pub board: Option<Vec<Vec<i32>>>,
}

impl Status {
  pub fn open() -> Self {
    Self {
      won: false,
      lost: false,
      board: None,
    }
  }
}
