use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::game::{DiceSource, Game, TurnEvent};
use crate::types::InterruptOutcome;

#[derive(Debug, Default, Clone, Serialize)]
pub struct GameStats {
    pub games: u32,
    pub total_turns: u64,
    pub total_rolls: u64,
    pub extra_turns: BTreeMap<String, u64>,
    pub interrupts: BTreeMap<String, u64>,
    pub purchases: u64,
    pub declines: u64,
    pub bonus_entries: u64,
    pub laps: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game<D: DiceSource>(&mut self, game: &Game<D>, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_turns += game.turns() as u64;
        self.total_rolls += game.rolls as u64;
        for event in &game.events {
            self.record_event(event);
        }
    }

    pub fn record_event(&mut self, event: &TurnEvent) {
        match event {
            TurnEvent::ExtraTurnGranted { reason, .. } => {
                *self.extra_turns.entry(reason.to_string()).or_insert(0) += 1;
            }
            TurnEvent::InterruptOpened { kind, .. } => {
                *self.interrupts.entry(kind.to_string()).or_insert(0) += 1;
            }
            TurnEvent::InterruptClosed { outcome, .. } => match outcome {
                InterruptOutcome::Purchased => self.purchases += 1,
                InterruptOutcome::Declined => self.declines += 1,
                InterruptOutcome::Done => {}
            },
            TurnEvent::EnteredBonusBranch { .. } => self.bonus_entries += 1,
            TurnEvent::PassedStart { .. } => self.laps += 1,
            _ => {}
        }
    }

    pub fn merge(&mut self, other: GameStats) {
        self.games += other.games;
        self.total_turns += other.total_turns;
        self.total_rolls += other.total_rolls;
        for (reason, count) in other.extra_turns {
            *self.extra_turns.entry(reason).or_insert(0) += count;
        }
        for (kind, count) in other.interrupts {
            *self.interrupts.entry(kind).or_insert(0) += count;
        }
        self.purchases += other.purchases;
        self.declines += other.declines;
        self.bonus_entries += other.bonus_entries;
        self.laps += other.laps;
        self.total_duration += other.total_duration;
    }

    pub fn get_avg_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }

    pub fn get_avg_rolls(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_rolls as f64 / self.games as f64
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self {
            stats: GameStats::new(),
        }
    }

    pub fn after<D: DiceSource>(&mut self, game: &Game<D>, duration: Duration) {
        self.stats.record_game(game, duration);
    }
}

impl Default for StatisticsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
