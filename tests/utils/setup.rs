use std::sync::Arc;

use undercover::game::state::{GameState, Phase, PlayerId, Role};
use undercover::room::{InMemoryRoomRepository, RoomRepository, RoomService};
use undercover::websockets::{BroadcastGateway, WsGateway};
use undercover::words::WordSource;

use super::mocks::{FixedWordSource, MockConnectionManager};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub service: Arc<RoomService>,
    pub repository: Arc<dyn RoomRepository>,
    pub connections: Arc<MockConnectionManager>,
    /// Player ids in join order; index 0 is the host.
    pub players: Vec<PlayerId>,
    pub room_code: String,
}

pub struct TestSetupBuilder {
    names: Vec<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { names: vec![] }
    }

    pub fn with_players(mut self, names: Vec<&str>) -> Self {
        self.names = names.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david"])
    }

    pub fn with_five_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david", "eve"])
    }

    pub async fn build(self) -> TestSetup {
        let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
        let connections = Arc::new(MockConnectionManager::new());
        let gateway: Arc<dyn BroadcastGateway> = Arc::new(WsGateway::new(connections.clone()));
        let words: Arc<dyn WordSource> = Arc::new(FixedWordSource::coffee_tea());
        let service = Arc::new(RoomService::new(repository.clone(), words, gateway));

        let players: Vec<PlayerId> = self.names.iter().map(|n| format!("id-{n}")).collect();

        let room_code = service
            .create_room(&players[0], &self.names[0])
            .await
            .expect("create_room failed");
        for (player_id, name) in players.iter().zip(&self.names).skip(1) {
            service
                .join_room(player_id, &room_code, name)
                .await
                .expect("join_room failed");
        }

        TestSetup {
            service,
            repository,
            connections,
            players,
            room_code,
        }
    }
}

impl TestSetup {
    pub async fn state(&self) -> GameState {
        self.service
            .room_state(&self.room_code)
            .await
            .expect("room gone")
    }

    /// Starts the game as the host with the given undercover count.
    pub async fn start_with(&self, undercover_count: usize) {
        self.service
            .update_settings(&self.players[0], undercover_count)
            .await
            .expect("update_settings failed");
        self.service
            .start_game(&self.players[0])
            .await
            .expect("start_game failed");
    }

    /// Every living player speaks once, moving the room into voting.
    pub async fn finish_clue_round(&self) {
        loop {
            let state = self.state().await;
            if state.phase != Phase::Playing {
                break;
            }
            let current = state.current_turn().expect("no current turn").clone();
            self.service
                .submit_clue(&current, "something vague")
                .await
                .expect("submit_clue failed");
        }
    }

    /// Unanimous vote against `target` (who votes for someone else).
    pub async fn vote_out(&self, target: &str) {
        let state = self.state().await;
        let voters: Vec<PlayerId> = state
            .seats()
            .iter()
            .filter(|s| s.is_alive)
            .map(|s| s.id.clone())
            .collect();
        let scapegoat = voters
            .iter()
            .find(|id| id.as_str() != target)
            .expect("no scapegoat")
            .clone();
        for voter in voters {
            let choice = if voter == target { &scapegoat } else { target };
            self.service
                .submit_vote(&voter, choice)
                .await
                .expect("submit_vote failed");
        }
    }

    pub async fn alive_with_role(&self, role: Role) -> Vec<PlayerId> {
        self.state()
            .await
            .seats()
            .iter()
            .filter(|s| s.is_alive && s.role == Some(role))
            .map(|s| s.id.clone())
            .collect()
    }
}
