use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algebra::{Cell, OperationKind, REVEALED_MINE};
use crate::compose::{compose_against_log, Operation};
use crate::error::{Error, Result};
use crate::store::{Append, Commit, Store};
use crate::types::{Caller, DisplayPoint, Status};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOperationRequest {
  pub game_id: i32,
  pub row: i32,
  pub col: i32,
  pub kind: OperationKind,
  /// Provisional sequence id: one past the highest committed id the client
  /// has observed. Committed operations at or above it are composed against
  /// this one and handed back as deltas.
  pub sequence_id: i64,
  /// Bounds the optimistic retry loop; `None` retries until it commits.
  pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedOperation {
  pub sequence_id: i64,
  pub row: i32,
  pub col: i32,
  pub kind: OperationKind,
  pub applied: bool,
  pub display_result: DisplayPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationConfirmation {
  pub operation: ConfirmedOperation,
  pub delta_operations: Vec<Operation>,
  pub status: Status,
}

/// Applies one client operation to a shared board, optimistically.
///
/// Each round composes the operation against everything committed past the
/// client's baseline, transforms the cell, and commits cell update plus log
/// append plus win/loss evaluation in a single transaction. A conflict on
/// the (game_id, sequence_id) uniqueness means another worker won the
/// sequence id; the round is rolled back and recomposed from the log. No
/// other failure retries.
pub async fn try_apply_operation<S: Store>(
  store: &S,
  caller: &Caller,
  request: ApplyOperationRequest,
) -> Result<OperationConfirmation> {
  let game = store
    .find_game(caller, request.game_id)
    .await?
    .ok_or(Error::GameNotFound {
      game_id: request.game_id,
    })?;
  if game.finished() {
    return Err(Error::GameFinished { game_id: game.id });
  }
  if !game.in_bounds(request.row, request.col) {
    return Err(Error::InvalidPosition {
      row: request.row,
      col: request.col,
    });
  }

  let incoming = Operation {
    kind: request.kind,
    row: request.row,
    col: request.col,
    sequence_id: request.sequence_id,
  };

  loop {
    let committed = store.operations_since(game.id, incoming.sequence_id).await?;
    let composition = compose_against_log(&committed, &incoming);
    let current = store.read_cell(game.id, incoming.row, incoming.col).await?;

    if !composition.should_apply {
      debug!(
        game_id = game.id,
        row = incoming.row,
        col = incoming.col,
        "operation superseded by a committed operation on the same cell"
      );
      return not_applied(incoming, composition.deltas, current);
    }

    let cell = Cell::from_raw(current)?;
    let transformed = incoming.kind.execute(cell).map_err(|_| Error::InvalidOperation {
      kind: incoming.kind,
      value: current,
    })?;
    let next = transformed.to_raw();
    if next == current {
      return not_applied(incoming, composition.deltas, current);
    }

    let mut tx = store.begin().await?;
    store
      .update_cell(&mut tx, game.id, incoming.row, incoming.col, next)
      .await?;

    let operation = Operation {
      sequence_id: composition.sequence_id,
      ..incoming
    };
    match store.append_operation(&mut tx, game.id, &operation).await? {
      Append::SequenceConflict => {
        store.rollback(tx).await?;
        debug!(
          game_id = game.id,
          sequence_id = operation.sequence_id,
          "sequence id already taken, recomposing"
        );
        tokio::task::yield_now().await;
        continue;
      }
      Append::Appended => {}
    }

    let mut status = Status::open();
    if next == REVEALED_MINE {
      status.lost = true;
      status.board = Some(store.scan_board(&mut tx, game.id).await?);
    } else if next >= 0 {
      let board = store.scan_board(&mut tx, game.id).await?;
      if !still_open(&board)? {
        status.won = true;
        status.board = Some(board);
      }
    }
    if status.won || status.lost {
      store.finish_game(&mut tx, game.id, status.won).await?;
    }

    match store.commit(tx).await? {
      Commit::SequenceConflict => {
        debug!(
          game_id = game.id,
          sequence_id = operation.sequence_id,
          "commit lost the sequence id race, recomposing"
        );
        tokio::task::yield_now().await;
        continue;
      }
      Commit::Committed => {}
    }

    if status.won || status.lost {
      info!(game_id = game.id, won = status.won, "game finished");
    }

    return Ok(OperationConfirmation {
      operation: ConfirmedOperation {
        sequence_id: operation.sequence_id,
        row: operation.row,
        col: operation.col,
        kind: operation.kind,
        applied: true,
        display_result: DisplayPoint::of(operation.row, operation.col, transformed),
      },
      delta_operations: composition.deltas,
      status,
    });
  }
}

/// Whether any cell still keeps the game open.
fn still_open(board: &[Vec<i32>]) -> Result<bool> {
  for row in board {
    for &value in row {
      if Cell::from_raw(value)?.blocks_win() {
        return Ok(true);
      }
    }
  }
  Ok(false)
}

fn not_applied(incoming: Operation, deltas: Vec<Operation>, current: i32) -> Result<OperationConfirmation> {
  Ok(OperationConfirmation {
    operation: ConfirmedOperation {
      sequence_id: incoming.sequence_id,
      row: incoming.row,
      col: incoming.col,
      kind: incoming.kind,
      applied: false,
      display_result: DisplayPoint::of(incoming.row, incoming.col, Cell::from_raw(current)?),
    },
    delta_operations: deltas,
    status: Status::open(),
  })
}
