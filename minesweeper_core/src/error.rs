use crate::algebra::OperationKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("Invalid dimensions rows = {rows}, cols = {cols}, boards go up to 100x100")]
  InvalidDimensions { rows: i32, cols: i32 },

  #[error("Too many mines ({mines}) for a {rows}x{cols} board")]
  TooManyMines { mines: i32, rows: i32, cols: i32 },

  #[error("A board needs at least one mine")]
  NoMines,

  #[error("No game found with id {game_id}")]
  GameNotFound { game_id: i32 },

  #[error("Game {game_id} has already finished")]
  GameFinished { game_id: i32 },

  #[error("Invalid position row = {row}, col = {col}")]
  InvalidPosition { row: i32, col: i32 },

  #[error("Cannot apply {kind:?} to a cell holding {value}")]
  InvalidOperation { kind: OperationKind, value: i32 },

  #[error("Value {value} is outside the cell encoding")]
  OutOfBounds { value: i32 },

  #[error("Operation timed out before it could be committed")]
  Timeout,

  #[error("Database error {cause}")]
  DatabaseError { cause: String },

  #[error("An unexpected error occurred: {message}")]
  Unexpected { message: &'static str },
}

impl std::convert::From<sqlx::Error> for Error {
  fn from(value: sqlx::Error) -> Self {
    Self::DatabaseError {
      cause: value.to_string(),
    }
  }
}

pub type Result<T> = core::result::Result<T, Error>;
