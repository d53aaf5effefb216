// Pure rules of the Undercover game: who gets which role, who a vote round
// eliminates, and when a side has won. Everything here is deterministic given
// its inputs except role shuffling, which uses the thread rng.

use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::game::state::{PlayerId, Role, Seat, Winner};

/// A game cannot start with fewer seats than this.
pub const MIN_PLAYERS: usize = 4;

/// Builds a shuffled role list for `player_count` seats: exactly
/// `undercover_count` undercovers, exactly one Mr. White, civilians for the
/// remainder. Callers must have validated the counts beforehand.
pub fn assign_roles(player_count: usize, undercover_count: usize) -> Vec<Role> {
    debug_assert!(player_count >= MIN_PLAYERS);
    debug_assert!(undercover_count >= 1);
    debug_assert!(player_count >= undercover_count + 3);

    let mut roles = vec![Role::Undercover; undercover_count];
    roles.push(Role::MrWhite);
    roles.extend(vec![Role::Civilian; player_count - undercover_count - 1]);
    roles.shuffle(&mut rand::rng());
    roles
}

/// Resolves a completed vote round. Returns the seat to eliminate, or `None`
/// when the top vote-getters are tied (a tie eliminates nobody and play
/// returns to another clue round).
pub fn tally_votes(votes: &HashMap<PlayerId, PlayerId>) -> Option<PlayerId> {
    let mut counts: HashMap<&PlayerId, usize> = HashMap::new();
    for target in votes.values() {
        *counts.entry(target).or_insert(0) += 1;
    }

    let max_votes = counts.values().copied().max()?;
    let mut top = counts
        .iter()
        .filter(|(_, count)| **count == max_votes)
        .map(|(id, _)| (*id).clone());

    let leader = top.next()?;
    match top.next() {
        Some(_) => None, // tied
        None => Some(leader),
    }
}

/// Evaluates whether either side has won, looking only at living seats.
///
/// - Civilians win once every undercover and Mr. White is gone.
/// - Undercovers (with Mr. White counted on their side) win once they are no
///   longer outnumbered by civilians.
///
/// Returns `None` while the game should continue, or before roles exist.
pub fn check_win_condition(seats: &[Seat]) -> Option<Winner> {
    let alive: Vec<&Seat> = seats.iter().filter(|s| s.is_alive).collect();
    if alive.is_empty() || alive.iter().any(|s| s.role.is_none()) {
        return None;
    }

    let civilians = alive
        .iter()
        .filter(|s| s.role == Some(Role::Civilian))
        .count();
    let infiltrators = alive.len() - civilians;

    if infiltrators == 0 {
        Some(Winner::Civilians)
    } else if infiltrators >= civilians {
        Some(Winner::Undercovers)
    } else {
        None
    }
}

/// Compares Mr. White's final guess against the civilian word,
/// case-insensitively and ignoring surrounding whitespace.
pub fn guess_matches(guess: &str, civilian_word: &str) -> bool {
    let guess = guess.trim();
    !guess.is_empty() && guess.eq_ignore_ascii_case(civilian_word.trim())
}
