pub mod base;
pub mod greedy;
pub mod random;

pub use base::BasePlayer;
pub use greedy::GreedyPlayer;
pub use random::RandomPlayer;
