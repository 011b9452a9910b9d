use rand::Rng;

use crate::game::PlayerState;
use crate::players::BasePlayer;
use crate::types::{InterruptKind, InterruptOutcome};

const DEFAULT_PURCHASE_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct RandomPlayer {
    pub purchase_probability: f64,
}

impl RandomPlayer {
    pub fn new(purchase_probability: Option<f64>) -> Self {
        Self {
            purchase_probability: purchase_probability
                .unwrap_or(DEFAULT_PURCHASE_PROBABILITY)
                .clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BasePlayer for RandomPlayer {
    fn decide(&self, _kind: InterruptKind, _player: &PlayerState) -> InterruptOutcome {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(self.purchase_probability) {
            InterruptOutcome::Purchased
        } else {
            InterruptOutcome::Declined
        }
    }
}
