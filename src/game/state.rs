// The authoritative per-room game state machine. Every mutating command the
// room manager accepts ends up in one of the methods here; each either fails
// without touching anything or leaves the state consistent for the next
// snapshot.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

use crate::game::logic::{
    assign_roles, check_win_condition, guess_matches, tally_votes, MIN_PLAYERS,
};
use crate::shared::GameError;
use crate::words::WordPair;

/// Stable per-connection identity, issued by the socket layer.
pub type PlayerId = String;

/// Hard cap on seats per room. A clue round with more speakers than this
/// stops being playable anyway.
pub const MAX_PLAYERS: usize = 12;

/// Host-adjustable default before `update_settings` is called.
pub const DEFAULT_UNDERCOVER_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Lobby,
    Playing,
    Voting,
    MrWhiteGuess,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Civilian,
    Undercover,
    MrWhite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Winner {
    Civilians,
    Undercovers,
    MrWhite,
}

/// One player's seat in a room. `role` and `word` stay unset until the game
/// starts; `word` stays unset for Mr. White even after assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_alive: bool,
    pub role: Option<Role>,
    pub word: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl Seat {
    pub fn new(id: PlayerId, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            is_alive: true,
            role: None,
            word: None,
            joined_at: Utc::now(),
        }
    }
}

/// A single submitted clue. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub player_id: PlayerId,
    pub player_name: String,
    pub clue: String,
    pub round: u32,
}

/// Authoritative game state for one room. Fields the turn and vote machinery
/// depends on stay private so every mutation flows through the methods below.
#[derive(Debug, Clone)]
pub struct GameState {
    pub room_code: String,
    pub phase: Phase,
    pub undercover_count: usize,
    pub round_number: u32,
    pub winner: Option<Winner>,
    /// Seat eliminated by the most recent vote round, if any.
    pub eliminated_player_id: Option<PlayerId>,
    seats: Vec<Seat>,
    /// Speaking order fixed when the game starts; never reordered afterwards.
    base_order: Vec<PlayerId>,
    /// `base_order` filtered to seats alive at the current round's start.
    turn_order: Vec<PlayerId>,
    current_turn_index: usize,
    clues: Vec<Clue>,
    votes: HashMap<PlayerId, PlayerId>,
    civilian_word: Option<String>,
    undercover_word: Option<String>,
    mr_white_guessed: bool,
}

impl GameState {
    pub fn new(room_code: String) -> Self {
        Self {
            room_code,
            phase: Phase::Lobby,
            undercover_count: DEFAULT_UNDERCOVER_COUNT,
            round_number: 1,
            winner: None,
            eliminated_player_id: None,
            seats: Vec::new(),
            base_order: Vec::new(),
            turn_order: Vec::new(),
            current_turn_index: 0,
            clues: Vec::new(),
            votes: HashMap::new(),
            civilian_word: None,
            undercover_word: None,
            mr_white_guessed: false,
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, player_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == player_id)
    }

    pub fn host_id(&self) -> Option<&PlayerId> {
        self.seats.iter().find(|s| s.is_host).map(|s| &s.id)
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn alive_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_alive).count()
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn votes_cast(&self) -> usize {
        self.votes.len()
    }

    pub fn civilian_word(&self) -> Option<&str> {
        self.civilian_word.as_deref()
    }

    pub fn undercover_word(&self) -> Option<&str> {
        self.undercover_word.as_deref()
    }

    /// The seat whose turn it is to speak, only meaningful while playing.
    pub fn current_turn(&self) -> Option<&PlayerId> {
        if self.phase == Phase::Playing {
            self.turn_order.get(self.current_turn_index)
        } else {
            None
        }
    }

    /// Adds a seat during the lobby phase. The first seat (or any seat added
    /// while no host remains) becomes host.
    pub fn add_seat(&mut self, player_id: PlayerId, name: String) -> Result<(), GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::GameInProgress);
        }
        if self.seats.len() >= MAX_PLAYERS {
            return Err(GameError::RoomFull);
        }
        if self
            .seats
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&name))
        {
            return Err(GameError::NameTaken);
        }

        let is_host = self.host_id().is_none();
        self.seats.push(Seat::new(player_id, name, is_host));
        Ok(())
    }

    /// Removes a seat at any phase. The room must remain playable for
    /// everyone else: host transfers to the earliest remaining seat, the turn
    /// skips past the departed speaker, pending votes involving them are
    /// dropped, and the win condition is re-evaluated as if they had been
    /// eliminated.
    pub fn remove_seat(&mut self, player_id: &str) -> Result<(), GameError> {
        let position = self
            .seats
            .iter()
            .position(|s| s.id == player_id)
            .ok_or(GameError::PlayerNotInRoom)?;

        let departed = self.seats.remove(position);
        self.base_order.retain(|id| id != player_id);

        if departed.is_host {
            if let Some(next_host) = self.seats.first_mut() {
                next_host.is_host = true;
            }
        }

        match self.phase {
            Phase::Playing => {
                if let Some(turn_pos) = self.turn_order.iter().position(|id| id == player_id) {
                    self.turn_order.remove(turn_pos);
                    if turn_pos < self.current_turn_index {
                        self.current_turn_index -= 1;
                    }
                }
                if self.current_turn_index >= self.turn_order.len() {
                    self.enter_voting();
                }
                if let Some(winner) = check_win_condition(&self.seats) {
                    self.finish(winner);
                }
            }
            Phase::Voting => {
                self.votes.remove(player_id);
                self.votes.retain(|_, target| target.as_str() != player_id);
                if let Some(winner) = check_win_condition(&self.seats) {
                    self.finish(winner);
                } else if !self.votes.is_empty() && self.votes.len() >= self.alive_count() {
                    self.resolve_votes();
                }
            }
            Phase::MrWhiteGuess => {
                // The pending guesser walking away counts as a wrong guess.
                if departed.role == Some(Role::MrWhite) {
                    self.mr_white_guessed = true;
                    self.finish_or_continue();
                }
            }
            Phase::Lobby | Phase::Results => {}
        }

        Ok(())
    }

    /// Host-only, lobby-only settings change.
    pub fn update_settings(
        &mut self,
        actor_id: &str,
        undercover_count: usize,
    ) -> Result<(), GameError> {
        if self.host_id().map(|id| id.as_str()) != Some(actor_id) {
            return Err(GameError::NotHost);
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhase);
        }

        // One seat goes to Mr. White and at least two must stay civilian.
        let max = self.seats.len().saturating_sub(3);
        if undercover_count < 1 || undercover_count > max {
            return Err(GameError::InvalidSettings(format!(
                "undercover count must be between 1 and {max}"
            )));
        }

        self.undercover_count = undercover_count;
        Ok(())
    }

    /// Starts the game: rolls roles and words, fixes the speaking order, and
    /// moves to the first clue round.
    pub fn start(&mut self, actor_id: &str, pair: WordPair) -> Result<(), GameError> {
        if self.host_id().map(|id| id.as_str()) != Some(actor_id) {
            return Err(GameError::NotHost);
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhase);
        }

        let player_count = self.seats.len();
        if player_count < MIN_PLAYERS {
            return Err(GameError::InvalidSettings(format!(
                "need at least {MIN_PLAYERS} players to start"
            )));
        }
        // One seat is Mr. White, so civilians only outnumber the infiltrators
        // at the start if at least two of them exist.
        let civilian_count = player_count
            .saturating_sub(self.undercover_count)
            .saturating_sub(1);
        if self.undercover_count < 1 || civilian_count < 2 {
            return Err(GameError::InvalidSettings(format!(
                "{} undercovers leaves too few civilians for {} players",
                self.undercover_count, player_count
            )));
        }

        let roles = assign_roles(player_count, self.undercover_count);
        for (seat, role) in self.seats.iter_mut().zip(roles) {
            seat.role = Some(role);
            seat.is_alive = true;
            seat.word = match role {
                Role::Civilian => Some(pair.civilian.clone()),
                Role::Undercover => Some(pair.undercover.clone()),
                Role::MrWhite => None,
            };
        }
        self.civilian_word = Some(pair.civilian);
        self.undercover_word = Some(pair.undercover);

        let mut order: Vec<PlayerId> = self.seats.iter().map(|s| s.id.clone()).collect();
        order.shuffle(&mut rand::rng());
        // Mr. White has no word to riff on, so they never speak first.
        if self.role_of(&order[0]) == Some(Role::MrWhite) {
            if let Some(swap) = order
                .iter()
                .position(|id| self.role_of(id) != Some(Role::MrWhite))
            {
                order.swap(0, swap);
            }
        }
        self.base_order = order.clone();
        self.turn_order = order;

        self.current_turn_index = 0;
        self.round_number = 1;
        self.clues.clear();
        self.votes.clear();
        self.winner = None;
        self.eliminated_player_id = None;
        self.mr_white_guessed = false;
        self.phase = Phase::Playing;
        Ok(())
    }

    /// Accepts a clue from the current speaker and advances the turn. Once
    /// every living player has spoken this round, voting opens.
    pub fn submit_clue(&mut self, player_id: &str, clue: String) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::WrongPhase);
        }
        let seat = self.seat(player_id).ok_or(GameError::PlayerNotInRoom)?;
        if !seat.is_alive {
            return Err(GameError::PlayerEliminated);
        }
        if self.current_turn().map(|id| id.as_str()) != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }

        self.clues.push(Clue {
            player_id: player_id.to_string(),
            player_name: seat.name.clone(),
            clue,
            round: self.round_number,
        });

        self.current_turn_index += 1;
        if self.current_turn_index >= self.turn_order.len() {
            self.enter_voting();
        }
        Ok(())
    }

    /// Records a vote; a later vote from the same voter overwrites. The round
    /// resolves as soon as every living player has voted.
    pub fn submit_vote(&mut self, voter_id: &str, target_id: &str) -> Result<(), GameError> {
        if self.phase != Phase::Voting {
            return Err(GameError::WrongPhase);
        }
        let voter = self.seat(voter_id).ok_or(GameError::PlayerNotInRoom)?;
        if !voter.is_alive {
            return Err(GameError::PlayerEliminated);
        }
        let valid_target = voter_id != target_id
            && self.seat(target_id).map(|s| s.is_alive).unwrap_or(false);
        if !valid_target {
            return Err(GameError::InvalidTarget);
        }

        self.votes
            .insert(voter_id.to_string(), target_id.to_string());

        if self.votes.len() >= self.alive_count() {
            self.resolve_votes();
        }
        Ok(())
    }

    /// Mr. White's single post-elimination guess at the civilian word.
    pub fn submit_guess(&mut self, player_id: &str, guess: &str) -> Result<(), GameError> {
        if self.phase != Phase::MrWhiteGuess {
            return Err(GameError::WrongPhase);
        }
        let seat = self.seat(player_id).ok_or(GameError::PlayerNotInRoom)?;
        if seat.role != Some(Role::MrWhite) {
            return Err(GameError::NotMrWhite);
        }
        if self.mr_white_guessed {
            return Err(GameError::AlreadyGuessed);
        }

        self.mr_white_guessed = true;
        let word = self.civilian_word.as_deref().unwrap_or_default();
        if guess_matches(guess, word) {
            self.finish(Winner::MrWhite);
        } else {
            self.finish_or_continue();
        }
        Ok(())
    }

    /// Returns the room to the lobby over the same seat roster: roles and
    /// words cleared, everyone revived, clue ledger emptied. Only valid once
    /// the previous game has finished.
    pub fn reset(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Results {
            return Err(GameError::WrongPhase);
        }

        for seat in &mut self.seats {
            seat.role = None;
            seat.word = None;
            seat.is_alive = true;
        }
        self.base_order.clear();
        self.turn_order.clear();
        self.current_turn_index = 0;
        self.round_number = 1;
        self.clues.clear();
        self.votes.clear();
        self.civilian_word = None;
        self.undercover_word = None;
        self.winner = None;
        self.eliminated_player_id = None;
        self.mr_white_guessed = false;
        self.phase = Phase::Lobby;
        Ok(())
    }

    fn role_of(&self, player_id: &str) -> Option<Role> {
        self.seat(player_id).and_then(|s| s.role)
    }

    fn enter_voting(&mut self) {
        self.phase = Phase::Voting;
        self.votes.clear();
    }

    fn resolve_votes(&mut self) {
        self.eliminated_player_id = None;
        let Some(target_id) = tally_votes(&self.votes) else {
            // Tie: nobody is eliminated, play another clue round.
            self.next_round();
            return;
        };

        let eliminated_role = self.role_of(&target_id);
        if let Some(seat) = self.seats.iter_mut().find(|s| s.id == target_id) {
            seat.is_alive = false;
        }
        self.eliminated_player_id = Some(target_id);

        if eliminated_role == Some(Role::MrWhite) {
            self.mr_white_guessed = false;
            self.phase = Phase::MrWhiteGuess;
        } else {
            self.finish_or_continue();
        }
    }

    fn finish_or_continue(&mut self) {
        match check_win_condition(&self.seats) {
            Some(winner) => self.finish(winner),
            None => self.next_round(),
        }
    }

    fn finish(&mut self, winner: Winner) {
        self.winner = Some(winner);
        self.phase = Phase::Results;
    }

    fn next_round(&mut self) {
        self.round_number += 1;
        self.votes.clear();
        self.turn_order = self
            .base_order
            .iter()
            .filter(|id| self.seat(id).map(|s| s.is_alive).unwrap_or(false))
            .cloned()
            .collect();
        self.current_turn_index = 0;
        self.phase = Phase::Playing;
    }
}
