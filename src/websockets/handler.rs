use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::room::RoomService;
use crate::shared::{AppState, GameError};
use crate::websockets::gateway::BroadcastGateway;
use crate::websockets::messages::{
    CreateRoomPayload, JoinRoomPayload, MessageType, MrWhiteGuessPayload, SubmitCluePayload,
    SubmitVotePayload, UpdateSettingsPayload, WebSocketMessage,
};

use super::socket::{Connection, MessageHandler};

/// Routes parsed client commands into the room service. Failures go back to
/// the initiator as ERROR frames; room state is untouched by a failed
/// command, so nobody else hears about it.
pub struct CommandDispatcher {
    room_service: Arc<RoomService>,
    gateway: Arc<dyn BroadcastGateway>,
}

impl CommandDispatcher {
    pub fn new(room_service: Arc<RoomService>, gateway: Arc<dyn BroadcastGateway>) -> Self {
        Self {
            room_service,
            gateway,
        }
    }

    async fn dispatch(&self, player_id: &str, message: WebSocketMessage) -> Result<(), String> {
        match message.message_type {
            MessageType::CreateRoom => {
                let p: CreateRoomPayload = parse(message.payload)?;
                self.room_service
                    .create_room(player_id, &p.name)
                    .await
                    .map(|_| ())
                    .map_err(game_error)
            }
            MessageType::JoinRoom => {
                let p: JoinRoomPayload = parse(message.payload)?;
                self.room_service
                    .join_room(player_id, &p.room_code, &p.name)
                    .await
                    .map_err(game_error)
            }
            MessageType::LeaveRoom => self
                .room_service
                .leave_room(player_id)
                .await
                .map_err(game_error),
            MessageType::UpdateSettings => {
                let p: UpdateSettingsPayload = parse(message.payload)?;
                self.room_service
                    .update_settings(player_id, p.undercover_count)
                    .await
                    .map_err(game_error)
            }
            MessageType::StartGame => self
                .room_service
                .start_game(player_id)
                .await
                .map_err(game_error),
            MessageType::SubmitClue => {
                let p: SubmitCluePayload = parse(message.payload)?;
                self.room_service
                    .submit_clue(player_id, &p.clue)
                    .await
                    .map_err(game_error)
            }
            MessageType::SubmitVote => {
                let p: SubmitVotePayload = parse(message.payload)?;
                self.room_service
                    .submit_vote(player_id, &p.target_id)
                    .await
                    .map_err(game_error)
            }
            MessageType::MrWhiteGuess => {
                let p: MrWhiteGuessPayload = parse(message.payload)?;
                self.room_service
                    .mr_white_guess(player_id, &p.guess)
                    .await
                    .map_err(game_error)
            }
            MessageType::PlayAgain => self
                .room_service
                .play_again(player_id)
                .await
                .map_err(game_error),
            other => {
                debug!(message_type = ?other, "Ignoring server-to-client message type from client");
                Ok(())
            }
        }
    }
}

fn parse<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(payload).map_err(|e| format!("Invalid payload: {e}"))
}

fn game_error(e: GameError) -> String {
    e.to_string()
}

#[async_trait]
impl MessageHandler for CommandDispatcher {
    async fn handle_message(&self, player_id: &str, message: String) {
        debug!(player_id = %player_id, message = %message, "Received message");

        let parsed = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(m) => m,
            Err(e) => {
                warn!(player_id = %player_id, error = %e, "Failed to parse WebSocket message");
                self.gateway
                    .send_error(player_id, "Malformed message")
                    .await;
                return;
            }
        };

        if let Err(reason) = self.dispatch(player_id, parsed).await {
            debug!(player_id = %player_id, reason = %reason, "Command rejected");
            self.gateway.send_error(player_id, &reason).await;
        }
    }
}

/// WebSocket endpoint. Identity is assigned server-side: every connection
/// gets a fresh UUID, announced in a CONNECTED frame before any command.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let player_id = Uuid::new_v4().to_string();
    info!(player_id = %player_id, "WebSocket connection established");

    // Outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(player_id.clone(), outbound_sender.clone())
        .await;

    // Tell the client who it is before anything else happens.
    let connected = WebSocketMessage::connected(player_id.clone());
    if let Ok(json) = serde_json::to_string(&connected) {
        let _ = outbound_sender.send(json);
    }

    let message_handler = Arc::new(CommandDispatcher::new(
        app_state.room_service.clone(),
        app_state.gateway.clone(),
    ));

    let connection = Connection::new(
        player_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(player_id = %player_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(player_id = %player_id, error = ?e, "WebSocket connection error");
        }
    }

    // Cleanup: drop the sender registration, then treat the disconnect as a
    // leave so the room stays playable for everyone else.
    app_state
        .connection_manager
        .remove_connection(&player_id)
        .await;
    app_state.room_service.handle_disconnect(&player_id).await;

    info!(player_id = %player_id, "WebSocket disconnect handled");
}
