use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::repository::{RoomRepository, SharedRoom};
use crate::game::state::{GameState, Phase, Winner};
use crate::shared::GameError;
use crate::websockets::gateway::BroadcastGateway;
use crate::words::WordSource;

/// Maximum length of player names after trimming.
const MAX_NAME_LENGTH: usize = 20;

/// Maximum length of clues and guesses; longer input is truncated.
const MAX_TEXT_LENGTH: usize = 50;

/// Orchestrates every external command: locks the one target room, applies
/// the mutation to its `GameState`, and hands the fresh snapshot to the
/// gateway. A failed command emits nothing here; the caller reports the
/// error to the initiator.
pub struct RoomService {
    repository: Arc<dyn RoomRepository>,
    words: Arc<dyn WordSource>,
    gateway: Arc<dyn BroadcastGateway>,
}

impl RoomService {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        words: Arc<dyn WordSource>,
        gateway: Arc<dyn BroadcastGateway>,
    ) -> Self {
        Self {
            repository,
            words,
            gateway,
        }
    }

    /// Creates a room with the caller as host. Returns the room code.
    #[instrument(skip(self))]
    pub async fn create_room(&self, player_id: &str, name: &str) -> Result<String, GameError> {
        let name = validate_name(name)?;

        let room = self.repository.insert_new().await;
        let mut room = room.lock().await;
        room.game.add_seat(player_id.to_string(), name)?;
        room.touch();

        info!(code = %room.code, player_id = %player_id, "Room created");
        self.gateway.room_created(&room.game, player_id).await;
        Ok(room.code.clone())
    }

    /// Joins an existing lobby under a display name.
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        player_id: &str,
        room_code: &str,
        name: &str,
    ) -> Result<(), GameError> {
        let name = validate_name(name)?;
        let code = super::code::normalize_room_code(room_code);

        let room = self.repository.get(&code).await.ok_or(GameError::RoomNotFound)?;
        let mut room = room.lock().await;
        room.game.add_seat(player_id.to_string(), name)?;
        room.touch();

        info!(code = %code, player_id = %player_id, players = room.game.player_count(), "Player joined");
        self.gateway.room_joined(&room.game, player_id).await;
        Ok(())
    }

    /// Removes the caller from whichever room they occupy. Empty rooms are
    /// torn down; if the departure decided the game, the end is announced.
    #[instrument(skip(self))]
    pub async fn leave_room(&self, player_id: &str) -> Result<(), GameError> {
        let room = self
            .repository
            .find_by_player(player_id)
            .await
            .ok_or(GameError::PlayerNotInRoom)?;
        let mut room = room.lock().await;

        let phase_before = room.game.phase;
        room.game.remove_seat(player_id)?;
        room.touch();

        if room.game.player_count() == 0 {
            let code = room.code.clone();
            drop(room);
            self.repository.remove(&code).await;
            info!(code = %code, "Empty room removed");
            return Ok(());
        }

        info!(code = %room.code, player_id = %player_id, players = room.game.player_count(), "Player left");
        self.gateway.player_left(&room.game, player_id).await;
        self.announce_if_just_ended(&room.game, phase_before).await;
        Ok(())
    }

    /// Host-only lobby settings change.
    #[instrument(skip(self))]
    pub async fn update_settings(
        &self,
        player_id: &str,
        undercover_count: usize,
    ) -> Result<(), GameError> {
        let room = self.room_of(player_id).await?;
        let mut room = room.lock().await;

        room.game.update_settings(player_id, undercover_count)?;
        room.touch();

        info!(code = %room.code, undercover_count, "Settings updated");
        self.gateway.settings_updated(&room.game).await;
        Ok(())
    }

    /// Host-only game start: rolls a word pair and deals roles.
    #[instrument(skip(self))]
    pub async fn start_game(&self, player_id: &str) -> Result<(), GameError> {
        let room = self.room_of(player_id).await?;
        let mut room = room.lock().await;

        let pair = self.words.pick();
        room.game.start(player_id, pair)?;
        room.touch();

        info!(
            code = %room.code,
            players = room.game.player_count(),
            undercover_count = room.game.undercover_count,
            "Game started"
        );
        self.gateway.game_started(&room.game).await;
        Ok(())
    }

    /// Accepts the current speaker's clue.
    #[instrument(skip(self))]
    pub async fn submit_clue(&self, player_id: &str, clue: &str) -> Result<(), GameError> {
        let clue = sanitize_text(clue).ok_or(GameError::EmptyClue)?;

        let room = self.room_of(player_id).await?;
        let mut room = room.lock().await;

        room.game.submit_clue(player_id, clue)?;
        room.touch();

        self.gateway.clue_submitted(&room.game).await;
        Ok(())
    }

    /// Records a vote; the final vote of the round may resolve an
    /// elimination, open the Mr. White guess phase, or end the game.
    #[instrument(skip(self))]
    pub async fn submit_vote(&self, player_id: &str, target_id: &str) -> Result<(), GameError> {
        let room = self.room_of(player_id).await?;
        let mut room = room.lock().await;

        let phase_before = room.game.phase;
        room.game.submit_vote(player_id, target_id)?;
        room.touch();

        self.gateway.vote_submitted(&room.game).await;
        self.announce_if_just_ended(&room.game, phase_before).await;
        Ok(())
    }

    /// Mr. White's single guess at the civilian word.
    #[instrument(skip(self))]
    pub async fn mr_white_guess(&self, player_id: &str, guess: &str) -> Result<(), GameError> {
        let guess = sanitize_text(guess).ok_or(GameError::EmptyGuess)?;

        let room = self.room_of(player_id).await?;
        let mut room = room.lock().await;

        let phase_before = room.game.phase;
        room.game.submit_guess(player_id, &guess)?;
        room.touch();

        let correct = room.game.winner == Some(Winner::MrWhite);
        info!(code = %room.code, player_id = %player_id, correct, "Mr. White guessed");
        self.gateway.guess_resolved(&room.game, correct).await;
        self.announce_if_just_ended(&room.game, phase_before).await;
        Ok(())
    }

    /// Returns a finished room to the lobby, roster intact. Any seated
    /// player may trigger it.
    #[instrument(skip(self))]
    pub async fn play_again(&self, player_id: &str) -> Result<(), GameError> {
        let room = self.room_of(player_id).await?;
        let mut room = room.lock().await;

        room.game.reset()?;
        room.touch();

        info!(code = %room.code, "Room reset to lobby");
        self.gateway.game_reset(&room.game).await;
        Ok(())
    }

    /// A dropped socket behaves exactly like an explicit leave. A player who
    /// never joined a room has nothing to clean up.
    #[instrument(skip(self))]
    pub async fn handle_disconnect(&self, player_id: &str) {
        match self.leave_room(player_id).await {
            Ok(()) => {}
            Err(GameError::PlayerNotInRoom) => {}
            Err(e) => {
                warn!(player_id = %player_id, error = %e, "Disconnect cleanup failed");
            }
        }
    }

    /// Snapshot of one room's state, for tests and diagnostics.
    pub async fn room_state(&self, room_code: &str) -> Result<GameState, GameError> {
        let code = super::code::normalize_room_code(room_code);
        let room = self.repository.get(&code).await.ok_or(GameError::RoomNotFound)?;
        let room = room.lock().await;
        Ok(room.game.clone())
    }

    async fn room_of(&self, player_id: &str) -> Result<SharedRoom, GameError> {
        self.repository
            .find_by_player(player_id)
            .await
            .ok_or(GameError::PlayerNotInRoom)
    }

    /// Emits GAME_ENDED when this command is the one that finished the game.
    async fn announce_if_just_ended(&self, game: &GameState, phase_before: Phase) {
        if game.phase == Phase::Results && phase_before != Phase::Results {
            info!(code = %game.room_code, winner = ?game.winner, "Game ended");
            self.gateway.game_ended(game).await;
        }
    }
}

/// Names must survive trimming and fit the display budget.
fn validate_name(name: &str) -> Result<String, GameError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(GameError::InvalidName);
    }
    Ok(name.to_string())
}

/// Trims free-text input and truncates it to the wire budget. Returns `None`
/// for input that is empty after trimming.
fn sanitize_text(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_TEXT_LENGTH).collect())
}
