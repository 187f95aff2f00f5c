use postgres_syntax::sql;
use sqlx::{PgPool, Postgres, Transaction};

use crate::algebra::OperationKind;
use crate::board::Board;
use crate::compose::Operation;
use crate::error::{Error, Result};
use crate::store::{Append, Commit, NewGame, Store};
use crate::types::{Caller, DateTimeUtc, Game, Json};

pub const SEQUENCE_CONSTRAINT: &str = "game_operations_sequence_id_unique";

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

type GameRow = (
  i32,
  i32,
  i32,
  i32,
  i32,
  bool,
  bool,
  bool,
  Option<DateTimeUtc>,
  DateTimeUtc,
);

fn game_from_row(row: GameRow) -> Game {
  let (id, rows, cols, mines, creator_id, private, won, lost, finished_at, created_at) = row;
  Game {
    id,
    rows,
    cols,
    mines,
    creator_id,
    private,
    won,
    lost,
    finished_at,
    created_at,
  }
}

fn is_sequence_conflict(error: &sqlx::Error) -> bool {
  if let sqlx::Error::Database(db_error) = error {
    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
      return db_error.is_unique_violation() && pg_error.constraint() == Some(SEQUENCE_CONSTRAINT);
    }
  }
  false
}

async fn fetch_board<'e, E>(executor: E, game_id: i32) -> Result<Vec<Vec<i32>>>
where
  E: sqlx::PgExecutor<'e>,
{
  let query = sql!(
    "
      SELECT row_index, column_index, mine_proximity
      FROM game_board_points
      WHERE game_id = $1
      ORDER BY row_index ASC, column_index ASC;
    "
  );

  let points: Vec<(i32, i32, i32)> = sqlx::query_as(query).bind(game_id).fetch_all(executor).await?;
  if points.is_empty() {
    return Err(Error::GameNotFound { game_id });
  }

  let mut board: Vec<Vec<i32>> = Vec::new();
  for (row, _, value) in points {
    let row = row as usize;
    if row == board.len() {
      board.push(Vec::new());
    }
    board[row].push(value);
  }
  Ok(board)
}

impl Store for PgStore {
  type Tx = Transaction<'static, Postgres>;

  async fn insert_game(&self, game: &NewGame, board: &Board) -> Result<i32> {
    let points = board
      .raw_rows()
      .into_iter()
      .enumerate()
      .flat_map(|(row, cells)| {
        cells.into_iter().enumerate().map(move |(col, value)| {
          serde_json::json!({
            "row_index": row as i32,
            "column_index": col as i32,
            "mine_proximity": value,
          })
        })
      })
      .collect::<Vec<_>>();
    let points = serde_json::Value::Array(points);

    let query = sql!(
      "
        WITH
          created_game AS (
            INSERT INTO games (row_count, col_count, mines, creator_id, private)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
          ),
          parsed AS (
            SELECT *
            FROM jsonb_to_recordset($6) AS points(row_index INTEGER, column_index INTEGER, mine_proximity INTEGER)
          ),
          created_points AS (
            INSERT INTO game_board_points (game_id, row_index, column_index, mine_proximity)
            SELECT created_game.id, parsed.row_index, parsed.column_index, parsed.mine_proximity
            FROM parsed, created_game
          )
        SELECT id
        FROM created_game;
      "
    );

    let (game_id,): (i32,) = sqlx::query_as(query)
      .bind(game.rows)
      .bind(game.cols)
      .bind(game.mines)
      .bind(game.creator_id)
      .bind(game.private)
      .bind(points)
      .fetch_one(&self.pool)
      .await?;

    Ok(game_id)
  }

  async fn find_game(&self, caller: &Caller, game_id: i32) -> Result<Option<Game>> {
    let query = sql!(
      "
        SELECT id, row_count, col_count, mines, creator_id, private, won, lost, finished_at, created_at
        FROM games
        WHERE id = $1 AND (creator_id = $2 OR private = FALSE)
        LIMIT 1;
      "
    );

    let row: Option<GameRow> = sqlx::query_as(query)
      .bind(game_id)
      .bind(caller.id)
      .fetch_optional(&self.pool)
      .await?;

    Ok(row.map(game_from_row))
  }

  async fn find_games(&self, caller: &Caller) -> Result<Vec<Game>> {
    let query = sql!(
      "
        SELECT id, row_count, col_count, mines, creator_id, private, won, lost, finished_at, created_at
        FROM games
        WHERE creator_id = $1 OR private = FALSE
        ORDER BY id ASC;
      "
    );

    let rows: Vec<GameRow> = sqlx::query_as(query).bind(caller.id).fetch_all(&self.pool).await?;
    Ok(rows.into_iter().map(game_from_row).collect())
  }

  async fn operations_since(&self, game_id: i32, baseline: i64) -> Result<Vec<Operation>> {
    let query = sql!(
      "
        SELECT to_json(operation) AS operation, row_index, column_index, sequence_id
        FROM game_operations
        WHERE game_id = $1 AND sequence_id >= $2
        ORDER BY sequence_id ASC;
      "
    );

    let rows: Vec<(Json<OperationKind>, i32, i32, i64)> = sqlx::query_as(query)
      .bind(game_id)
      .bind(baseline)
      .fetch_all(&self.pool)
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(Json(kind), row, col, sequence_id)| Operation {
          kind,
          row,
          col,
          sequence_id,
        })
        .collect(),
    )
  }

  async fn read_cell(&self, game_id: i32, row: i32, col: i32) -> Result<i32> {
    let query = sql!(
      "
        SELECT mine_proximity
        FROM game_board_points
        WHERE game_id = $1 AND row_index = $2 AND column_index = $3
        LIMIT 1;
      "
    );

    let value: Option<(i32,)> = sqlx::query_as(query)
      .bind(game_id)
      .bind(row)
      .bind(col)
      .fetch_optional(&self.pool)
      .await?;

    value.map(|(value,)| value).ok_or(Error::InvalidPosition { row, col })
  }

  async fn read_board(&self, game_id: i32) -> Result<Vec<Vec<i32>>> {
    fetch_board(&self.pool, game_id).await
  }

  async fn begin(&self) -> Result<Self::Tx> {
    Ok(self.pool.begin().await?)
  }

  async fn update_cell(&self, tx: &mut Self::Tx, game_id: i32, row: i32, col: i32, value: i32) -> Result<()> {
    let query = sql!(
      "
        UPDATE game_board_points
        SET mine_proximity = $4
        WHERE game_id = $1 AND row_index = $2 AND column_index = $3;
      "
    );

    let affected = sqlx::query(query)
      .bind(game_id)
      .bind(row)
      .bind(col)
      .bind(value)
      .execute(&mut **tx)
      .await?
      .rows_affected();

    if affected != 1 {
      return Err(Error::Unexpected {
        message: "expected to update exactly one board point",
      });
    }
    Ok(())
  }

  async fn append_operation(&self, tx: &mut Self::Tx, game_id: i32, operation: &Operation) -> Result<Append> {
    let query = sql!(
      "
        INSERT INTO game_operations (game_id, sequence_id, operation, row_index, column_index)
        VALUES ($1, $2, $3, $4, $5);
      "
    );

    let inserted = sqlx::query(query)
      .bind(game_id)
      .bind(operation.sequence_id)
      .bind::<&'static str>(operation.kind.into())
      .bind(operation.row)
      .bind(operation.col)
      .execute(&mut **tx)
      .await;

    match inserted {
      Ok(_) => Ok(Append::Appended),
      Err(error) if is_sequence_conflict(&error) => Ok(Append::SequenceConflict),
      Err(error) => Err(error.into()),
    }
  }

  async fn scan_board(&self, tx: &mut Self::Tx, game_id: i32) -> Result<Vec<Vec<i32>>> {
    fetch_board(&mut **tx, game_id).await
  }

  async fn finish_game(&self, tx: &mut Self::Tx, game_id: i32, won: bool) -> Result<()> {
    let query = sql!(
      "
        UPDATE games
        SET won = $2, lost = $3, finished_at = NOW()
        WHERE id = $1;
      "
    );

    sqlx::query(query)
      .bind(game_id)
      .bind(won)
      .bind(!won)
      .execute(&mut **tx)
      .await?;
    Ok(())
  }

  async fn commit(&self, tx: Self::Tx) -> Result<Commit> {
    match tx.commit().await {
      Ok(()) => Ok(Commit::Committed),
      Err(error) if is_sequence_conflict(&error) => Ok(Commit::SequenceConflict),
      Err(error) => Err(error.into()),
    }
  }

  async fn rollback(&self, tx: Self::Tx) -> Result<()> {
    Ok(tx.rollback().await?)
  }
}
