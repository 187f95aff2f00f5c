use minesweeper_core::types::{
  CreateGameRequest, Error, Games, MemoryStore, PointState, RetrieveGameRequest,
};
use rstest::*;
use tests_integration::{caller, mark, setup_with_board, TestSetup};

#[rstest]
#[tokio::test]
async fn test_should_create_a_game_and_retrieve_a_fully_masked_board() {
  let games = Games::try_new(MemoryStore::new()).await.unwrap();
  let creator = caller(7, "creator");

  let created = games
    .try_create_game(
      &creator,
      CreateGameRequest {
        rows: 5,
        cols: 4,
        mines: 6,
        private: false,
      },
    )
    .await
    .unwrap();

  let retrieved = games
    .try_retrieve_game(
      &creator,
      RetrieveGameRequest {
        game_id: created.game_id,
      },
    )
    .await
    .unwrap();

  assert_eq!(retrieved.game.id, created.game_id);
  assert_eq!(retrieved.game.rows, 5);
  assert_eq!(retrieved.game.cols, 4);
  assert_eq!(retrieved.game.mines, 6);
  assert_eq!(retrieved.game.creator_id, creator.id);
  assert!(!retrieved.game.finished());
  assert_eq!(retrieved.game.finished_at, None);

  assert_eq!(retrieved.board.len(), 5);
  for row in &retrieved.board {
    assert_eq!(row.len(), 4);
    for point in row {
      assert_eq!(point.state, PointState::NotRevealed);
      assert_eq!(point.proximity, None);
    }
  }
}

#[rstest]
#[tokio::test]
async fn test_should_reject_invalid_dimensions_on_creation() {
  let games = Games::try_new(MemoryStore::new()).await.unwrap();

  let error = games
    .try_create_game(
      &caller(7, "creator"),
      CreateGameRequest {
        rows: 0,
        cols: 4,
        mines: 1,
        private: false,
      },
    )
    .await
    .unwrap_err();

  assert_eq!(error, Error::InvalidDimensions { rows: 0, cols: 4 });
}

#[rstest]
#[tokio::test]
async fn test_should_reject_a_mine_for_every_cell_on_creation() {
  let games = Games::try_new(MemoryStore::new()).await.unwrap();

  let error = games
    .try_create_game(
      &caller(7, "creator"),
      CreateGameRequest {
        rows: 3,
        cols: 3,
        mines: 9,
        private: false,
      },
    )
    .await
    .unwrap_err();

  assert_eq!(
    error,
    Error::TooManyMines {
      mines: 9,
      rows: 3,
      cols: 3
    }
  );
}

#[rstest]
#[tokio::test]
async fn test_should_not_retrieve_a_game_that_does_not_exist() {
  let games = Games::try_new(MemoryStore::new()).await.unwrap();

  let error = games
    .try_retrieve_game(&caller(7, "creator"), RetrieveGameRequest { game_id: 999 })
    .await
    .unwrap_err();

  assert_eq!(error, Error::GameNotFound { game_id: 999 });
}

#[rstest]
#[tokio::test]
async fn test_should_hide_private_games_from_other_players() {
  let TestSetup { games, game_id, .. } = setup_with_board(3, 3, &[(0, 1)], true).await.unwrap();

  let error = games
    .try_retrieve_game(&caller(2, "someone else"), RetrieveGameRequest { game_id })
    .await
    .unwrap_err();

  assert_eq!(error, Error::GameNotFound { game_id });
}

#[rstest]
#[tokio::test]
async fn test_should_list_only_games_visible_to_the_caller() {
  let games = Games::try_new(MemoryStore::new()).await.unwrap();
  let creator = caller(1, "creator");
  let other = caller(2, "someone else");

  let public = games
    .try_create_game(
      &creator,
      CreateGameRequest {
        rows: 3,
        cols: 3,
        mines: 1,
        private: false,
      },
    )
    .await
    .unwrap();
  let private = games
    .try_create_game(
      &creator,
      CreateGameRequest {
        rows: 3,
        cols: 3,
        mines: 1,
        private: true,
      },
    )
    .await
    .unwrap();

  let visible_to_creator = games.try_find_games(&creator).await.unwrap();
  assert_eq!(
    visible_to_creator.games.iter().map(|game| game.id).collect::<Vec<_>>(),
    vec![public.game_id, private.game_id]
  );

  let visible_to_other = games.try_find_games(&other).await.unwrap();
  assert_eq!(
    visible_to_other.games.iter().map(|game| game.id).collect::<Vec<_>>(),
    vec![public.game_id]
  );
}

#[rstest]
#[tokio::test]
async fn test_should_show_marks_in_the_retrieved_board() {
  let TestSetup {
    games,
    creator,
    game_id,
    ..
  } = setup_with_board(3, 3, &[(0, 1), (2, 2)], false).await.unwrap();

  games
    .try_apply_operation(&creator, mark(game_id, 1, 1, 1))
    .await
    .unwrap();

  let retrieved = games
    .try_retrieve_game(&creator, RetrieveGameRequest { game_id })
    .await
    .unwrap();

  assert_eq!(retrieved.board[1][1].state, PointState::SuspectMine);
  assert_eq!(retrieved.board[1][1].proximity, None);
  assert_eq!(retrieved.board[0][0].state, PointState::NotRevealed);
}
