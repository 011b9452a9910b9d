use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Location, PlayerId, PlayerKind};

/// Flags that carry over from one turn to the next roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFlags {
    pub single_die_next_roll: bool,
    pub branch_entry_next_roll: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub location: Location,
    pub flags: PlayerFlags,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            location: Location::default(),
            flags: PlayerFlags::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, PlayerKind::Human)
    }

    pub fn grant_branch_entry(&mut self) {
        self.flags.single_die_next_roll = true;
        self.flags.branch_entry_next_roll = true;
    }

    /// Reads and clears the single-die flag.
    pub fn take_single_die(&mut self) -> bool {
        std::mem::take(&mut self.flags.single_die_next_roll)
    }

    /// Reads and clears the branch-entry flag.
    pub fn take_branch_entry(&mut self) -> bool {
        std::mem::take(&mut self.flags.branch_entry_next_roll)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("a roster needs at least one player")]
    Empty,
    #[error("player {0} seated twice")]
    DuplicatePlayer(PlayerId),
    #[error("no player with id {0}")]
    MissingPlayer(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type TurnObserver = Box<dyn FnMut(&PlayerState) + Send>;

/// Seated players in fixed round-robin order, plus the turn-change observers.
pub struct PlayerRoster {
    players: Vec<PlayerState>,
    current: usize,
    observers: Vec<(ObserverId, TurnObserver)>,
    next_observer: u64,
}

impl PlayerRoster {
    pub fn new(players: Vec<PlayerState>) -> Result<Self, RosterError> {
        if players.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player.id) {
                return Err(RosterError::DuplicatePlayer(player.id));
            }
        }
        Ok(Self {
            players,
            current: 0,
            observers: Vec::new(),
            next_observer: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &PlayerState {
        &self.players[self.current]
    }

    pub fn current_mut(&mut self) -> &mut PlayerState {
        &mut self.players[self.current]
    }

    pub fn get(&self, id: PlayerId) -> Result<&PlayerState, RosterError> {
        self.players
            .iter()
            .find(|player| player.id == id)
            .ok_or(RosterError::MissingPlayer(id))
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState, RosterError> {
        self.players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RosterError::MissingPlayer(id))
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Moves the turn pointer to the next seat and notifies every observer.
    pub fn advance(&mut self) -> &PlayerState {
        self.current = (self.current + 1) % self.players.len();
        let player = &self.players[self.current];
        for (_, observer) in self.observers.iter_mut() {
            observer(player);
        }
        player
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&PlayerState) + Send + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }
}

impl fmt::Debug for PlayerRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerRoster")
            .field("players", &self.players)
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn roster(size: u32) -> PlayerRoster {
        let players = (0..size)
            .map(|id| PlayerState::new(PlayerId(id), format!("Seat {id}"), PlayerKind::Ai))
            .collect();
        PlayerRoster::new(players).unwrap()
    }

    #[test]
    fn rejects_empty_and_duplicate_rosters() {
        assert_eq!(PlayerRoster::new(vec![]).unwrap_err(), RosterError::Empty);
        let twice = vec![
            PlayerState::new(PlayerId(1), "A", PlayerKind::Human),
            PlayerState::new(PlayerId(1), "B", PlayerKind::Ai),
        ];
        assert_eq!(
            PlayerRoster::new(twice).unwrap_err(),
            RosterError::DuplicatePlayer(PlayerId(1))
        );
    }

    #[test]
    fn advance_returns_to_start_only_after_full_rounds() {
        for m in 1..=4u32 {
            for k in 0..=9usize {
                let mut roster = roster(m);
                let original = roster.current().id;
                for _ in 0..k {
                    roster.advance();
                }
                assert_eq!(
                    roster.current().id == original,
                    k % m as usize == 0,
                    "m={m} k={k}"
                );
            }
        }
    }

    #[test]
    fn unknown_ids_are_reported_not_panicked() {
        let mut roster = roster(2);
        assert_eq!(
            roster.get(PlayerId(9)).unwrap_err(),
            RosterError::MissingPlayer(PlayerId(9))
        );
        assert!(roster.get_mut(PlayerId(1)).is_ok());
    }

    #[test]
    fn observers_fire_on_advance_until_unsubscribed() {
        let mut roster = roster(3);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = roster.subscribe(move |player| sink.lock().unwrap().push(player.id));

        roster.advance();
        roster.advance();
        assert!(roster.unsubscribe(id));
        roster.advance();
        assert!(!roster.unsubscribe(id));

        assert_eq!(*seen.lock().unwrap(), vec![PlayerId(1), PlayerId(2)]);
    }

    #[test]
    fn flags_are_cleared_when_taken() {
        let mut player = PlayerState::new(PlayerId(0), "Hero", PlayerKind::Human);
        player.grant_branch_entry();
        assert!(player.take_single_die());
        assert!(!player.take_single_die());
        assert!(player.take_branch_entry());
        assert_eq!(player.flags, PlayerFlags::default());
    }
}
