#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod game;
pub mod players;
pub mod types;

pub use board::{BoardType, PathTopology, Tile};
pub use game::{Game, GameConfig, TurnEvent, TurnMachine, TurnState};
pub use types::{Location, PlayerId};
