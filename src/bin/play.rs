use std::io::{self, BufRead, Write};

use clap::Parser;
use fortune_road::BoardType;
use fortune_road::cli::players::PlayerInstance;
use fortune_road::cli::{HumanPlayer, create_player, print_player_help};
use fortune_road::game::{Animator, Game, GameConfig, PlayerState, Seat, TurnEvent};
use fortune_road::types::{Location, PlayerId, PlayerKind};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(name = "fortune-road-play")]
#[command(about = "Play Fortune Road against bots")]
struct Args {
    /// Bot player code (R=Random, G=Greedy)
    #[arg(short = 'b', long, default_value = "R")]
    bot: String,

    /// Number of bot seats
    #[arg(long, default_value_t = 1)]
    bots: usize,

    /// Bot-specific parameters (comma-separated)
    #[arg(long, default_value = "")]
    bot_params: String,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Board: STANDARD or MINI
    #[arg(long, default_value = "STANDARD")]
    board: BoardType,

    /// Completed turns before the game stops
    #[arg(long, default_value_t = 40)]
    turns: u32,

    /// Roll without waiting for Enter
    #[arg(long)]
    auto_roll: bool,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,
}

/// Prints each hop instead of tweening a token.
struct ConsoleAnimator<'a> {
    topology: &'a fortune_road::PathTopology,
}

impl Animator for ConsoleAnimator<'_> {
    fn animate_to(&mut self, player: &PlayerState, location: Location) {
        let name = self
            .topology
            .tile_at_location(location)
            .map_or("?", |tile| tile.name.as_str());
        println!("   {} -> {} ({})", player.name, location, name);
    }
}

fn wait_for_enter(name: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\n{name}, press Enter to roll... ")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn describe(game: &Game, event: &TurnEvent) -> Option<String> {
    let name = |id: PlayerId| {
        game.machine
            .player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| id.to_string())
    };
    let line = match event {
        TurnEvent::DiceRolled { player, roll, steps } => {
            format!("{} rolled {roll} and moves {steps}", name(*player))
        }
        TurnEvent::PassedStart { player } => format!("{} passed Start", name(*player)),
        TurnEvent::EnteredBonusBranch { player } => {
            format!("{} turned onto the bonus branch", name(*player))
        }
        TurnEvent::ExitedBonusBranch { player } => {
            format!("{} rejoined the main loop", name(*player))
        }
        TurnEvent::InterruptClosed { player, kind, outcome } => {
            format!("{}: {kind} -> {outcome}", name(*player))
        }
        TurnEvent::ExtraTurnGranted { player, reason } => {
            format!("{} earns an extra turn ({reason})", name(*player))
        }
        TurnEvent::CurrentPlayerChanged { player } => {
            format!("{}\nNow playing: {}", "-".repeat(40), name(*player))
        }
        _ => return None,
    };
    Some(line)
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if args.help_players {
        print_player_help();
        return;
    }

    let bot_params: Vec<&str> = if args.bot_params.is_empty() {
        Vec::new()
    } else {
        args.bot_params.split(',').collect()
    };
    let bot = match create_player(&args.bot, bot_params) {
        Some(player) if player.kind() == PlayerKind::Ai => player,
        _ => {
            eprintln!("Error: Unknown bot code '{}'", args.bot);
            eprintln!("Use --help-players to see available codes");
            std::process::exit(1);
        }
    };

    let mut players = vec![PlayerInstance::Human(HumanPlayer::new())];
    players.extend(std::iter::repeat(bot).take(args.bots.max(1)));
    let seats: Vec<Seat> = players
        .iter()
        .enumerate()
        .map(|(idx, player)| match player.kind() {
            PlayerKind::Human => Seat::new("You", PlayerKind::Human),
            PlayerKind::Ai => Seat::new(format!("Bot {idx}"), PlayerKind::Ai),
        })
        .collect();

    let config = GameConfig {
        board: args.board,
        seed: args.seed,
        turns_limit: args.turns,
        ..GameConfig::default()
    };

    let mut game = match Game::new(config, &seats) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    println!("Starting game on the {} board, {} seats, {} turns", args.board, seats.len(), args.turns);
    println!("{}", "=".repeat(80));

    let topology = game.machine.topology().clone();
    let mut animator = ConsoleAnimator {
        topology: &topology,
    };

    while !game.is_over() {
        if game.machine.can_roll() && game.machine.current_player().is_human() && !args.auto_roll {
            if let Err(err) = wait_for_enter(&game.machine.current_player().name) {
                eprintln!("Error: {err}");
                break;
            }
        }
        match game.play_tick(&players, &mut animator) {
            Ok(outcome) => {
                for event in &outcome.events {
                    if let Some(line) = describe(&game, event) {
                        println!("{line}");
                    }
                }
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("FINAL POSITIONS after {} turns:", game.turns());
    println!("{}", "=".repeat(80));
    for player in game.machine.roster().players() {
        let tile = topology
            .tile_at_location(player.location)
            .map_or("?", |tile| tile.name.as_str());
        println!("{:<10} {:<12} {}", player.name, player.location.to_string(), tile);
    }
}
