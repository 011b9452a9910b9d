use crate::cli::HumanPlayer;
use crate::game::PlayerState;
use crate::players::{BasePlayer, GreedyPlayer, RandomPlayer};
use crate::types::{InterruptKind, InterruptOutcome, PlayerKind};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "H",
        name: "HumanPlayer",
        description: "Answers purchase prompts on the terminal.",
    },
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Buys at random. First param is the purchase probability (default 0.5).",
    },
    CliPlayer {
        code: "G",
        name: "GreedyPlayer",
        description: "Buys whenever offered.",
    },
];

#[derive(Debug, Clone)]
pub enum PlayerInstance {
    Human(HumanPlayer),
    Random(RandomPlayer),
    Greedy(GreedyPlayer),
}

impl PlayerInstance {
    pub fn kind(&self) -> PlayerKind {
        match self {
            PlayerInstance::Human(_) => PlayerKind::Human,
            PlayerInstance::Random(_) | PlayerInstance::Greedy(_) => PlayerKind::Ai,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerInstance::Human(_) => "Human",
            PlayerInstance::Random(_) => "Random",
            PlayerInstance::Greedy(_) => "Greedy",
        }
    }
}

impl BasePlayer for PlayerInstance {
    fn decide(&self, kind: InterruptKind, player: &PlayerState) -> InterruptOutcome {
        match self {
            PlayerInstance::Human(p) => p.decide(kind, player),
            PlayerInstance::Random(p) => p.decide(kind, player),
            PlayerInstance::Greedy(p) => p.decide(kind, player),
        }
    }
}

pub fn create_player(code: &str, params: Vec<&str>) -> Option<PlayerInstance> {
    match code {
        "H" => Some(PlayerInstance::Human(HumanPlayer::new())),
        "R" => {
            let probability = params.first().and_then(|s| s.parse::<f64>().ok());
            Some(PlayerInstance::Random(RandomPlayer::new(probability)))
        }
        "G" => Some(PlayerInstance::Greedy(GreedyPlayer)),
        _ => None,
    }
}

/// Parses `R,R:0.2,G` into one player per seat.
pub fn parse_players(codes: &str) -> Result<Vec<PlayerInstance>, String> {
    codes.split(',')
        .map(|key| {
            let mut parts = key.trim().split(':');
            let code = parts.next().unwrap_or_default();
            create_player(code, parts.collect())
                .ok_or_else(|| format!("unknown player code '{code}'"))
        })
        .collect()
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}
