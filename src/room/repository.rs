use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use super::code::generate_room_code;
use super::models::RoomModel;

/// Rooms are shared as an Arc over a tokio mutex so each room serializes its
/// own commands while different rooms proceed in parallel.
pub type SharedRoom = Arc<Mutex<RoomModel>>;

/// Registry of live rooms keyed by room code.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Creates a room under a freshly generated unique code.
    async fn insert_new(&self) -> SharedRoom;

    async fn get(&self, code: &str) -> Option<SharedRoom>;

    async fn remove(&self, code: &str);

    /// Finds the room a player currently occupies, used on socket disconnect
    /// where only the player id is known.
    async fn find_by_player(&self, player_id: &str) -> Option<SharedRoom>;

    /// Room codes whose last activity is older than the threshold.
    async fn list_idle(&self, threshold: Duration) -> Vec<String>;

    async fn len(&self) -> usize;
}

/// In-memory implementation backing the single-process server.
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, SharedRoom>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self))]
    async fn insert_new(&self) -> SharedRoom {
        // Generate under the write lock so a colliding code cannot slip in
        // between the check and the insert.
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = generate_room_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
            debug!(code = %candidate, "Room code collision, retrying");
        };

        let room: SharedRoom = Arc::new(Mutex::new(RoomModel::new(code.clone())));
        rooms.insert(code.clone(), room.clone());
        info!(code = %code, total_rooms = rooms.len(), "Room created");
        room
    }

    async fn get(&self, code: &str) -> Option<SharedRoom> {
        let rooms = self.rooms.read().await;
        rooms.get(code).cloned()
    }

    #[instrument(skip(self))]
    async fn remove(&self, code: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.remove(code).is_some() {
            info!(code = %code, total_rooms = rooms.len(), "Room removed");
        }
    }

    async fn find_by_player(&self, player_id: &str) -> Option<SharedRoom> {
        // Clone the arcs first so room locks are never taken while holding
        // the registry lock.
        let candidates: Vec<SharedRoom> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        for room in candidates {
            if room.lock().await.game.seat(player_id).is_some() {
                return Some(room);
            }
        }
        None
    }

    async fn list_idle(&self, threshold: Duration) -> Vec<String> {
        let candidates: Vec<SharedRoom> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        let cutoff = chrono::Utc::now()
            - chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::zero());

        let mut idle = Vec::new();
        for room in candidates {
            let room = room.lock().await;
            if room.last_activity < cutoff {
                idle.push(room.code.clone());
            }
        }
        idle
    }

    async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_new_registers_room_under_its_code() {
        let repo = InMemoryRoomRepository::new();
        let room = repo.insert_new().await;
        let code = room.lock().await.code.clone();

        assert_eq!(repo.len().await, 1);
        assert!(repo.get(&code).await.is_some());
        assert!(repo.get("NOSUCH").await.is_none());
    }

    #[tokio::test]
    async fn codes_are_unique_across_rooms() {
        let repo = InMemoryRoomRepository::new();
        let mut codes = std::collections::HashSet::new();
        for _ in 0..20 {
            let room = repo.insert_new().await;
            codes.insert(room.lock().await.code.clone());
        }
        assert_eq!(codes.len(), 20);
    }

    #[tokio::test]
    async fn remove_deletes_the_room() {
        let repo = InMemoryRoomRepository::new();
        let room = repo.insert_new().await;
        let code = room.lock().await.code.clone();

        repo.remove(&code).await;
        assert!(repo.get(&code).await.is_none());
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn find_by_player_scans_rooms() {
        let repo = InMemoryRoomRepository::new();
        let room = repo.insert_new().await;
        let code = room.lock().await.code.clone();
        room.lock()
            .await
            .game
            .add_seat("player-1".to_string(), "alice".to_string())
            .unwrap();

        let found = repo.find_by_player("player-1").await.unwrap();
        assert_eq!(found.lock().await.code, code);
        assert!(repo.find_by_player("player-2").await.is_none());
    }

    #[tokio::test]
    async fn list_idle_respects_threshold() {
        let repo = InMemoryRoomRepository::new();
        let room = repo.insert_new().await;
        let code = room.lock().await.code.clone();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let idle = repo.list_idle(Duration::from_millis(1)).await;
        assert_eq!(idle, vec![code]);

        let idle = repo.list_idle(Duration::from_secs(3600)).await;
        assert!(idle.is_empty());
    }
}
