use crate::game::PlayerState;
use crate::types::{InterruptKind, InterruptOutcome};

/// Answers the purchase prompts raised while this seat's turn is interrupted.
pub trait BasePlayer {
    fn decide(&self, kind: InterruptKind, player: &PlayerState) -> InterruptOutcome;
}
