use std::sync::Arc;
use thiserror::Error;

use crate::room::repository::RoomRepository;
use crate::room::service::RoomService;
use crate::websockets::connection_manager::ConnectionManager;
use crate::websockets::gateway::BroadcastGateway;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<RoomService>,
    pub room_repository: Arc<dyn RoomRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub gateway: Arc<dyn BroadcastGateway>,
}

impl AppState {
    pub fn new(
        room_service: Arc<RoomService>,
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
        gateway: Arc<dyn BroadcastGateway>,
    ) -> Self {
        Self {
            room_service,
            room_repository,
            connection_manager,
            gateway,
        }
    }
}

/// Every way a command can fail. All of these are recoverable: the failed
/// command is reported to its initiator only and room state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Game already in progress")]
    GameInProgress,

    #[error("Only the host can do that")]
    NotHost,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Eliminated players cannot act")]
    PlayerEliminated,

    #[error("Clue cannot be empty")]
    EmptyClue,

    #[error("Guess cannot be empty")]
    EmptyGuess,

    #[error("Invalid vote target")]
    InvalidTarget,

    #[error("Only Mr. White can guess")]
    NotMrWhite,

    #[error("Guess already submitted")]
    AlreadyGuessed,

    #[error("That action is not allowed in the current phase")]
    WrongPhase,

    #[error("Invalid player name")]
    InvalidName,

    #[error("A player with this name is already in the room")]
    NameTaken,

    #[error("Player is not in this room")]
    PlayerNotInRoom,
}
