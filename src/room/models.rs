use chrono::{DateTime, Utc};

use crate::game::GameState;

/// One live room: the game state plus the bookkeeping the cleanup task needs.
#[derive(Debug)]
pub struct RoomModel {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub game: GameState,
}

impl RoomModel {
    pub fn new(code: String) -> Self {
        let now = Utc::now();
        Self {
            game: GameState::new(code.clone()),
            code,
            created_at: now,
            last_activity: now,
        }
    }

    /// Marks the room active. Every accepted command calls this so the
    /// cleanup task only reaps rooms nobody is touching.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.game.player_count() == 0
    }
}
