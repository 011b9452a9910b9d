use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use clap::Parser;
use fortune_road::BoardType;
use fortune_road::cli::players::PlayerInstance;
use fortune_road::cli::{GameStats, StatisticsAccumulator, parse_players, print_player_help};
use fortune_road::game::{Game, GameConfig, InstantAnimator, Seat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(name = "fortune-road-sim")]
#[command(about = "Fortune Road simulator - run headless games between bot seats")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated player codes (e.g., R,R,G or R:0.2,G)
    /// Use ':' to set player-specific params (e.g., R:0.1 for purchase probability)
    #[arg(long, default_value = "R,R,R,R")]
    players: String,

    /// JSON game config; the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board: STANDARD or MINI
    #[arg(long)]
    board: Option<BoardType>,

    /// Dice per normal roll (1 or 2)
    #[arg(long)]
    dice: Option<u8>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Completed turns per game
    #[arg(long)]
    turns: Option<u32>,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence per-game output
    #[arg(long)]
    quiet: bool,

    /// Print the aggregated statistics as JSON
    #[arg(long)]
    json: bool,

    /// Number of worker threads for parallel execution
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig, String> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path).map_err(|err| err.to_string())?,
            None => GameConfig::default(),
        };
        if let Some(board) = self.board {
            config.board = board;
        }
        if let Some(dice) = self.dice {
            config.dice_per_roll = dice;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(turns) = self.turns {
            config.turns_limit = turns;
        }
        config.normal_arity().map_err(|err| err.to_string())?;
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.help_players {
        print_player_help();
        return;
    }

    let players = parse_players(&args.players).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        eprintln!("Use --help-players to see available codes");
        std::process::exit(1);
    });

    let config = args.game_config().unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });

    let mut stats = StatisticsAccumulator::new();
    if args.workers > 1 {
        run_parallel_simulations(&args, &config, &players, &mut stats);
    } else {
        run_sequential_simulations(&args, &config, &players, &mut stats);
    }

    if args.json {
        match serde_json::to_string_pretty(&stats.stats) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    } else if !args.quiet {
        print_summary(&stats.stats, &config, &players);
    }
}

fn seats_for(players: &[PlayerInstance]) -> Vec<Seat> {
    players
        .iter()
        .enumerate()
        .map(|(idx, player)| Seat::new(format!("{} {}", player.label(), idx + 1), player.kind()))
        .collect()
}

/// Game `n` of a batch plays with `seed + n`, wrapping at the top of the range.
fn game_seed(base: u64, game_idx: u32) -> u64 {
    base.wrapping_add(u64::from(game_idx))
}

fn run_one(
    config: &GameConfig,
    players: &[PlayerInstance],
    game_idx: u32,
) -> Option<(Game, std::time::Duration)> {
    let config = GameConfig {
        seed: game_seed(config.seed, game_idx),
        ..config.clone()
    };
    let start = Instant::now();
    let mut game = match Game::new(config, &seats_for(players)) {
        Ok(game) => game,
        Err(err) => {
            tracing::error!(%err, game_idx, "could not set up game");
            return None;
        }
    };
    if let Err(err) = game.play(players, &mut InstantAnimator) {
        tracing::error!(%err, game = %game.id, "game aborted");
        return None;
    }
    Some((game, start.elapsed()))
}

fn run_sequential_simulations(
    args: &Args,
    config: &GameConfig,
    players: &[PlayerInstance],
    stats: &mut StatisticsAccumulator,
) {
    let print_rows = !args.quiet && !args.json;
    for game_idx in 0..args.num {
        let Some((game, duration)) = run_one(config, players, game_idx) else {
            continue;
        };
        stats.after(&game, duration);

        if print_rows {
            let last_n = 10;
            if game_idx < last_n || game_idx >= args.num.saturating_sub(last_n) {
                println!(
                    "Game {:>4}: Turns={:>4}, Rolls={:>5}, Duration={:?}",
                    game_idx + 1,
                    game.turns(),
                    game.rolls,
                    duration
                );
            } else if (game_idx + 1) % 100 == 0 {
                print!(".");
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn run_parallel_simulations(
    args: &Args,
    config: &GameConfig,
    players: &[PlayerInstance],
    stats: &mut StatisticsAccumulator,
) {
    let players = Arc::new(players.to_vec());
    let config = Arc::new(config.clone());
    let workers = args.workers as u32;
    let games_per_worker = args.num / workers;
    let remainder = args.num % workers;

    let handles: Vec<_> = (0..workers)
        .map(|worker_id| {
            let players = Arc::clone(&players);
            let config = Arc::clone(&config);
            let num_games = games_per_worker + u32::from(worker_id < remainder);
            let start_idx = worker_id * games_per_worker + worker_id.min(remainder);

            thread::spawn(move || {
                let mut local = StatisticsAccumulator::new();
                for game_idx in start_idx..start_idx + num_games {
                    if let Some((game, duration)) = run_one(&config, &players, game_idx) {
                        local.after(&game, duration);
                    }
                }
                local.stats
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(worker_stats) => stats.stats.merge(worker_stats),
            Err(_) => tracing::error!("simulation worker panicked"),
        }
    }
}

fn print_summary(stats: &GameStats, config: &GameConfig, players: &[PlayerInstance]) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    let seating: Vec<_> = players.iter().map(PlayerInstance::label).collect();
    println!("\nBoard: {}, Dice: {}, Seats: [{}]", config.board, config.dice_per_roll, seating.join(","));

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.games);
    println!("  Avg Turns: {:.2}", stats.get_avg_turns());
    println!("  Avg Rolls: {:.2}", stats.get_avg_rolls());
    println!("  Avg Duration: {:.2?}", stats.get_avg_duration());
    println!("  Laps: {}", stats.laps);
    println!("  Bonus Branch Entries: {}", stats.bonus_entries);
    println!("  Purchases: {}  Declines: {}", stats.purchases, stats.declines);

    println!("\nExtra Turns:");
    for (reason, count) in &stats.extra_turns {
        println!("  {:<20} {}", reason, count);
    }

    println!("\nInterrupts:");
    for (kind, count) in &stats.interrupts {
        println!("  {:<20} {}", kind, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_seeds_wrap_instead_of_overflowing() {
        assert_eq!(game_seed(42, 3), 45);
        assert_eq!(game_seed(u64::MAX, 0), u64::MAX);
        assert_eq!(game_seed(u64::MAX, 2), 1);
    }
}
