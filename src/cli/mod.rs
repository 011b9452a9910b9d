pub mod human_player;
pub mod players;
pub mod stats;

pub use human_player::HumanPlayer;
pub use players::{CLI_PLAYERS, CliPlayer, PlayerInstance, create_player, parse_players, print_player_help};
pub use stats::{GameStats, StatisticsAccumulator};
