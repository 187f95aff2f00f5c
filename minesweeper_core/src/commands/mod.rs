mod apply_operation;
mod create_game;
mod query;

pub use apply_operation::{try_apply_operation, ApplyOperationRequest, ConfirmedOperation, OperationConfirmation};
pub use create_game::{try_create_game, CreateGameRequest, CreateGameResponse};
pub use query::{try_find_games, try_retrieve_game, FindGamesResponse, RetrieveGameRequest, RetrieveGameResponse};
