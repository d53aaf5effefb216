use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::view::{ClientGameState, PlayerData};
use crate::game::{PlayerId, Winner};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    UpdateSettings,
    StartGame,
    SubmitClue,
    SubmitVote,
    MrWhiteGuess,
    PlayAgain,

    // Server -> Client
    Connected,
    RoomCreated,
    RoomJoined,
    PlayerJoined,
    PlayerLeft,
    SettingsUpdated,
    GameStarted,
    RoleAssigned,
    ClueSubmitted,
    VoteSubmitted,
    GuessResolved,
    GameEnded,
    GameReset,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
    pub player_id: Option<PlayerId>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomPayload {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    pub room_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsPayload {
    pub undercover_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitCluePayload {
    pub clue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVotePayload {
    pub target_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MrWhiteGuessPayload {
    pub guess: String,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedPayload {
    /// Server-assigned identity for this connection
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStatePayload {
    pub state: ClientGameState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLeftPayload {
    pub player_id: PlayerId,
    pub state: ClientGameState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignedPayload {
    pub player: PlayerData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteSubmittedPayload {
    pub votes_cast: usize,
    /// Present once this vote completed the round and eliminated someone
    pub eliminated_player_id: Option<PlayerId>,
    pub state: ClientGameState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResolvedPayload {
    pub correct: bool,
    pub state: ClientGameState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEndedPayload {
    pub winner: Winner,
    pub civilian_word: String,
    pub undercover_word: String,
    pub state: ClientGameState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                player_id: None,
            }),
        }
    }

    /// Create a CONNECTED message
    pub fn connected(player_id: PlayerId) -> Self {
        let payload = ConnectedPayload { player_id };
        Self::new(
            MessageType::Connected,
            serde_json::to_value(payload).unwrap(),
        )
    }

    fn room_state(message_type: MessageType, state: ClientGameState) -> Self {
        let payload = RoomStatePayload { state };
        Self::new(message_type, serde_json::to_value(payload).unwrap())
    }

    /// Create a ROOM_CREATED message
    pub fn room_created(state: ClientGameState) -> Self {
        Self::room_state(MessageType::RoomCreated, state)
    }

    /// Create a ROOM_JOINED message, sent to the joiner themselves
    pub fn room_joined(state: ClientGameState) -> Self {
        Self::room_state(MessageType::RoomJoined, state)
    }

    /// Create a PLAYER_JOINED message, sent to everyone else in the room
    pub fn player_joined(state: ClientGameState) -> Self {
        Self::room_state(MessageType::PlayerJoined, state)
    }

    /// Create a PLAYER_LEFT message
    pub fn player_left(player_id: PlayerId, state: ClientGameState) -> Self {
        let payload = PlayerLeftPayload { player_id, state };
        Self::new(
            MessageType::PlayerLeft,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a SETTINGS_UPDATED message
    pub fn settings_updated(state: ClientGameState) -> Self {
        Self::room_state(MessageType::SettingsUpdated, state)
    }

    /// Create a GAME_STARTED message
    pub fn game_started(state: ClientGameState) -> Self {
        Self::room_state(MessageType::GameStarted, state)
    }

    /// Create a ROLE_ASSIGNED message carrying one player's private secrets
    pub fn role_assigned(player: PlayerData) -> Self {
        let payload = RoleAssignedPayload { player };
        Self::new(
            MessageType::RoleAssigned,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a CLUE_SUBMITTED message
    pub fn clue_submitted(state: ClientGameState) -> Self {
        Self::room_state(MessageType::ClueSubmitted, state)
    }

    /// Create a VOTE_SUBMITTED message
    pub fn vote_submitted(
        votes_cast: usize,
        eliminated_player_id: Option<PlayerId>,
        state: ClientGameState,
    ) -> Self {
        let payload = VoteSubmittedPayload {
            votes_cast,
            eliminated_player_id,
            state,
        };
        Self::new(
            MessageType::VoteSubmitted,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a GUESS_RESOLVED message
    pub fn guess_resolved(correct: bool, state: ClientGameState) -> Self {
        let payload = GuessResolvedPayload { correct, state };
        Self::new(
            MessageType::GuessResolved,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a GAME_ENDED message revealing both words
    pub fn game_ended(
        winner: Winner,
        civilian_word: String,
        undercover_word: String,
        state: ClientGameState,
    ) -> Self {
        let payload = GameEndedPayload {
            winner,
            civilian_word,
            undercover_word,
            state,
        };
        Self::new(
            MessageType::GameEnded,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a GAME_RESET message
    pub fn game_reset(state: ClientGameState) -> Self {
        Self::room_state(MessageType::GameReset, state)
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Self {
        let payload = ErrorPayload { message };
        Self::new(MessageType::Error, serde_json::to_value(payload).unwrap())
    }
}
