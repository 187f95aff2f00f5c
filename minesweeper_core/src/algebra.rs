use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use crate::error::{Error, Result};

// A cell is persisted as one signed integer:
//
//    0..=8    revealed, value = adjacent mines
//    9        revealed mine
//   -1..=-9   hidden, -(proximity + 1)
//   -10       hidden mine
//   -11..=-20 the -1..=-10 band marked as a suspected mine
//   -21..=-30 the -1..=-10 band marked as a certain mine
//
// The proximity baked in at generation time never changes; reveal unmasks
// it and mark cycles the band.

pub const REVEALED_MINE: i32 = 9;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, IntoStaticStr)]
pub enum OperationKind {
  Reveal,
  Mark,
}

impl OperationKind {
  pub fn execute(self, cell: Cell) -> Result<Cell> {
    match self {
      Self::Reveal => cell.reveal(),
      Self::Mark => cell.mark(),
    }
  }

  pub fn execute_raw(self, value: i32) -> Result<i32> {
    self.execute(Cell::from_raw(value)?).map(Cell::to_raw)
  }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum MarkTier {
  Unmarked,
  Suspect,
  Certain,
}

impl MarkTier {
  fn cycled(self) -> Self {
    match self {
      Self::Unmarked => Self::Suspect,
      Self::Suspect => Self::Certain,
      Self::Certain => Self::Unmarked,
    }
  }

  fn offset(self) -> i32 {
    match self {
      Self::Unmarked => 0,
      Self::Suspect => -10,
      Self::Certain => -20,
    }
  }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Cell {
  Hidden { mine: bool, proximity: u8, mark: MarkTier },
  Revealed { proximity: u8 },
  RevealedMine,
}

impl Cell {
  pub fn hidden(mine: bool, proximity: u8) -> Self {
    Self::Hidden {
      mine,
      proximity,
      mark: MarkTier::Unmarked,
    }
  }

  pub fn from_raw(value: i32) -> Result<Self> {
    let (base, mark) = match value {
      0..=8 => return Ok(Self::Revealed { proximity: value as u8 }),
      REVEALED_MINE => return Ok(Self::RevealedMine),
      -10..=-1 => (value, MarkTier::Unmarked),
      -20..=-11 => (value + 10, MarkTier::Suspect),
      -30..=-21 => (value + 20, MarkTier::Certain),
      _ => return Err(Error::OutOfBounds { value }),
    };
    Ok(Self::Hidden {
      mine: base == -10,
      proximity: if base == -10 { 0 } else { (-base - 1) as u8 },
      mark,
    })
  }

  pub fn to_raw(self) -> i32 {
    match self {
      Self::Revealed { proximity } => proximity as i32,
      Self::RevealedMine => REVEALED_MINE,
      Self::Hidden { mine: true, mark, .. } => -10 + mark.offset(),
      Self::Hidden {
        mine: false,
        proximity,
        mark,
      } => -(proximity as i32 + 1) + mark.offset(),
    }
  }

  /// Unmasks the cell. Revealing an already revealed cell is a valid no-op;
  /// revealing a marked cell is not a valid operation.
  pub fn reveal(self) -> Result<Self> {
    match self {
      Self::Revealed { .. } => Ok(self),
      Self::Hidden {
        mine: true,
        mark: MarkTier::Unmarked,
        ..
      } => Ok(Self::RevealedMine),
      Self::Hidden {
        mine: false,
        proximity,
        mark: MarkTier::Unmarked,
      } => Ok(Self::Revealed { proximity }),
      _ => Err(Error::OutOfBounds { value: self.to_raw() }),
    }
  }

  /// Cycles the mark band: unmarked, suspected mine, certain mine, unmarked.
  /// Marking a revealed cell is a valid no-op; a revealed mine is terminal.
  pub fn mark(self) -> Result<Self> {
    match self {
      Self::Revealed { .. } => Ok(self),
      Self::RevealedMine => Err(Error::OutOfBounds { value: REVEALED_MINE }),
      Self::Hidden { mine, proximity, mark } => Ok(Self::Hidden {
        mine,
        proximity,
        mark: mark.cycled(),
      }),
    }
  }

  pub fn is_mine(self) -> bool {
    matches!(self, Self::Hidden { mine: true, .. } | Self::RevealedMine)
  }

  /// A cell that keeps the game open: hidden, not a mine and not yet marked
  /// as a certain mine. The game is won once no such cell remains.
  pub fn blocks_win(self) -> bool {
    matches!(
      self,
      Self::Hidden {
        mine: false,
        mark: MarkTier::Unmarked | MarkTier::Suspect,
        ..
      }
    )
  }
}
