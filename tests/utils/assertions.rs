use undercover::websockets::{MessageType, WebSocketMessage};

use super::mocks::MockConnectionManager;

// ============================================================================
// Message Assertions
// ============================================================================

/// Payloads of every frame of the given type sent to one player, in order.
pub async fn payloads_of_type(
    connections: &MockConnectionManager,
    player_id: &str,
    message_type: MessageType,
) -> Vec<serde_json::Value> {
    connections
        .get_messages_for(player_id)
        .await
        .iter()
        .filter_map(|raw| serde_json::from_str::<WebSocketMessage>(raw).ok())
        .filter(|m| m.message_type == message_type)
        .map(|m| m.payload)
        .collect()
}

/// The most recent payload of the given type, panicking if none was sent.
pub async fn last_payload_of_type(
    connections: &MockConnectionManager,
    player_id: &str,
    message_type: MessageType,
) -> serde_json::Value {
    payloads_of_type(connections, player_id, message_type.clone())
        .await
        .pop()
        .unwrap_or_else(|| panic!("no {message_type:?} message sent to {player_id}"))
}

pub async fn count_of_type(
    connections: &MockConnectionManager,
    player_id: &str,
    message_type: MessageType,
) -> usize {
    payloads_of_type(connections, player_id, message_type)
        .await
        .len()
}
