use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use undercover::websockets::ConnectionManager;
use undercover::words::{WordPair, WordSource};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Connection manager that records every frame instead of sending it, so
/// tests can assert on exactly what each player was told.
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get_messages_for(&self, player_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(player_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, _player_id: String, _sender: mpsc::UnboundedSender<String>) {}

    async fn remove_connection(&self, _player_id: &str) {}

    async fn send_to_player(&self, player_id: &str, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(player_id.to_string())
            .or_default()
            .push(message.to_string());
    }

    async fn send_to_players(&self, player_ids: &[String], message: &str) {
        for player_id in player_ids {
            self.send_to_player(player_id, message).await;
        }
    }
}

/// Deterministic word source so scenarios can assert on exact words.
pub struct FixedWordSource {
    pub pair: WordPair,
}

impl FixedWordSource {
    pub fn coffee_tea() -> Self {
        Self {
            pair: WordPair::new("coffee", "tea"),
        }
    }
}

impl WordSource for FixedWordSource {
    fn pick(&self) -> WordPair {
        self.pair.clone()
    }
}
