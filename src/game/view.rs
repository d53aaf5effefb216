// Client-facing projections of the authoritative state. Roles and words are
// secret until the results phase, so broadcasts go through `view` with the
// recipient's id and only that seat's secrets survive the projection.

use serde::{Deserialize, Serialize};

use crate::game::state::{GameState, Phase, PlayerId, Role, Winner};

/// One seat as a given viewer is allowed to see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSeat {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

/// One submitted clue as sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientClue {
    pub player_id: PlayerId,
    pub player_name: String,
    pub clue: String,
    pub round: u32,
}

/// The full room snapshot pushed to one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientGameState {
    pub room_code: String,
    pub phase: Phase,
    pub player_count: usize,
    pub undercover_count: usize,
    pub players: Vec<ClientSeat>,
    pub current_turn: Option<PlayerId>,
    pub round_number: u32,
    pub clues: Vec<ClientClue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

/// The viewer's own secrets, delivered privately at game start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub role: Option<Role>,
    pub word: Option<String>,
    pub is_alive: bool,
}

/// Projects the room state for one viewer. Other seats' role and word are
/// stripped until the game reaches results, where everything is revealed.
pub fn view(game: &GameState, viewer_id: &str) -> ClientGameState {
    let reveal_all = game.phase == Phase::Results;

    let players = game
        .seats()
        .iter()
        .map(|seat| {
            let own = seat.id == viewer_id;
            ClientSeat {
                id: seat.id.clone(),
                name: seat.name.clone(),
                is_host: seat.is_host,
                is_alive: seat.is_alive,
                role: (own || reveal_all).then_some(seat.role).flatten(),
                word: if own || reveal_all {
                    seat.word.clone()
                } else {
                    None
                },
            }
        })
        .collect();

    ClientGameState {
        room_code: game.room_code.clone(),
        phase: game.phase,
        player_count: game.player_count(),
        undercover_count: game.undercover_count,
        players,
        current_turn: game.current_turn().cloned(),
        round_number: game.round_number,
        clues: game
            .clues()
            .iter()
            .map(|c| ClientClue {
                player_id: c.player_id.clone(),
                player_name: c.player_name.clone(),
                clue: c.clue.clone(),
                round: c.round,
            })
            .collect(),
        winner: game.winner,
    }
}

/// Extracts one seat's private role and word.
pub fn player_data(game: &GameState, player_id: &str) -> Option<PlayerData> {
    game.seat(player_id).map(|seat| PlayerData {
        role: seat.role,
        word: seat.word.clone(),
        is_alive: seat.is_alive,
    })
}
