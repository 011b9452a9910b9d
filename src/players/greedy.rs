use crate::game::PlayerState;
use crate::players::BasePlayer;
use crate::types::{InterruptKind, InterruptOutcome};

/// Buys whenever offered.
#[derive(Debug, Clone, Default)]
pub struct GreedyPlayer;

impl BasePlayer for GreedyPlayer {
    fn decide(&self, _kind: InterruptKind, _player: &PlayerState) -> InterruptOutcome {
        InterruptOutcome::Purchased
    }
}
