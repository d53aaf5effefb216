use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::game::view::{player_data, view, ClientGameState};
use crate::game::GameState;
use crate::websockets::connection_manager::ConnectionManager;
use crate::websockets::messages::WebSocketMessage;

/// Outbound fan-out for room events. The room service calls these after each
/// successful command; implementations decide who hears about it and what
/// each recipient is allowed to see.
#[async_trait]
pub trait BroadcastGateway: Send + Sync {
    async fn room_created(&self, game: &GameState, creator_id: &str);

    async fn room_joined(&self, game: &GameState, joiner_id: &str);

    async fn player_left(&self, game: &GameState, player_id: &str);

    async fn settings_updated(&self, game: &GameState);

    async fn game_started(&self, game: &GameState);

    async fn clue_submitted(&self, game: &GameState);

    async fn vote_submitted(&self, game: &GameState);

    async fn guess_resolved(&self, game: &GameState, correct: bool);

    async fn game_ended(&self, game: &GameState);

    async fn game_reset(&self, game: &GameState);

    async fn send_error(&self, player_id: &str, message: &str);
}

/// Gateway pushing JSON frames through the connection manager. Snapshots are
/// projected per recipient so nobody receives another seat's secrets.
pub struct WsGateway {
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WsGateway {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            connection_manager,
        }
    }

    async fn send(&self, player_id: &str, message: &WebSocketMessage) {
        match serde_json::to_string(message) {
            Ok(json) => self.connection_manager.send_to_player(player_id, &json).await,
            Err(e) => warn!(player_id = %player_id, error = %e, "Failed to serialize message"),
        }
    }

    /// Sends each seat its own projection of the room, built by `make`.
    async fn broadcast_views<F>(&self, game: &GameState, make: F)
    where
        F: Fn(ClientGameState) -> WebSocketMessage,
    {
        for seat in game.seats() {
            let message = make(view(game, &seat.id));
            self.send(&seat.id, &message).await;
        }
    }
}

#[async_trait]
impl BroadcastGateway for WsGateway {
    async fn room_created(&self, game: &GameState, creator_id: &str) {
        let message = WebSocketMessage::room_created(view(game, creator_id));
        self.send(creator_id, &message).await;
    }

    async fn room_joined(&self, game: &GameState, joiner_id: &str) {
        for seat in game.seats() {
            let snapshot = view(game, &seat.id);
            let message = if seat.id == joiner_id {
                WebSocketMessage::room_joined(snapshot)
            } else {
                WebSocketMessage::player_joined(snapshot)
            };
            self.send(&seat.id, &message).await;
        }
    }

    async fn player_left(&self, game: &GameState, player_id: &str) {
        self.broadcast_views(game, |state| {
            WebSocketMessage::player_left(player_id.to_string(), state)
        })
        .await;
    }

    async fn settings_updated(&self, game: &GameState) {
        self.broadcast_views(game, WebSocketMessage::settings_updated)
            .await;
    }

    async fn game_started(&self, game: &GameState) {
        self.broadcast_views(game, WebSocketMessage::game_started)
            .await;

        // Each seat additionally gets its private role and word.
        for seat in game.seats() {
            if let Some(data) = player_data(game, &seat.id) {
                let message = WebSocketMessage::role_assigned(data);
                self.send(&seat.id, &message).await;
            }
        }
    }

    async fn clue_submitted(&self, game: &GameState) {
        self.broadcast_views(game, WebSocketMessage::clue_submitted)
            .await;
    }

    async fn vote_submitted(&self, game: &GameState) {
        let votes_cast = game.votes_cast();
        let eliminated = game.eliminated_player_id.clone();
        self.broadcast_views(game, |state| {
            WebSocketMessage::vote_submitted(votes_cast, eliminated.clone(), state)
        })
        .await;
    }

    async fn guess_resolved(&self, game: &GameState, correct: bool) {
        self.broadcast_views(game, |state| {
            WebSocketMessage::guess_resolved(correct, state)
        })
        .await;
    }

    async fn game_ended(&self, game: &GameState) {
        let Some(winner) = game.winner else {
            warn!(room_code = %game.room_code, "game_ended called without a winner");
            return;
        };
        let civilian_word = game.civilian_word().unwrap_or_default().to_string();
        let undercover_word = game.undercover_word().unwrap_or_default().to_string();

        self.broadcast_views(game, |state| {
            WebSocketMessage::game_ended(
                winner,
                civilian_word.clone(),
                undercover_word.clone(),
                state,
            )
        })
        .await;
    }

    async fn game_reset(&self, game: &GameState) {
        self.broadcast_views(game, WebSocketMessage::game_reset)
            .await;
    }

    async fn send_error(&self, player_id: &str, message: &str) {
        let message = WebSocketMessage::error(message.to_string());
        self.send(player_id, &message).await;
    }
}
