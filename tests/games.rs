use std::time::Duration;

use fortune_road::board::{BoardType, PathTopology};
use fortune_road::cli::{StatisticsAccumulator, parse_players};
use fortune_road::game::{
    Game, GameConfig, InstantAnimator, PlayerFlags, ScriptedDice, Seat, TurnEvent, plan_movement,
};
use fortune_road::players::{GreedyPlayer, RandomPlayer};
use fortune_road::types::{Location, PlayerKind};

fn bots(count: usize) -> Vec<Seat> {
    (0..count)
        .map(|idx| Seat::new(format!("Bot {idx}"), PlayerKind::Ai))
        .collect()
}

#[test]
fn main_loop_plans_are_consecutive_and_wrap() {
    let topology = PathTopology::build(BoardType::Standard).unwrap();
    let len = topology.main_len();
    for start in [0, 13, 38, 39] {
        for steps in 1..=12u32 {
            let plan = plan_movement(
                &topology,
                Location::OnMainLoop(start),
                steps,
                PlayerFlags::default(),
            );
            assert_eq!(plan.len(), steps as usize);
            for (offset, location) in plan.steps().iter().enumerate() {
                assert_eq!(*location, Location::OnMainLoop((start + offset + 1) % len));
            }
        }
    }
}

#[test]
fn mini_board_game_runs_to_its_turn_limit() {
    let config = GameConfig {
        board: BoardType::Mini,
        dice_per_roll: 1,
        turns_limit: 50,
        ..GameConfig::default()
    };
    let mut game = Game::new(config, &bots(3)).unwrap();
    let players = vec![RandomPlayer::new(Some(0.5)); 3];
    assert_eq!(game.play(&players, &mut InstantAnimator).unwrap(), 50);

    let completed = game
        .events
        .iter()
        .filter(|event| matches!(event, TurnEvent::TurnCompleted { .. }))
        .count();
    assert_eq!(completed, 50);
    assert!(!game.machine.gateway().is_open());
}

#[test]
fn scripted_game_is_tallied_by_the_accumulator() {
    let config = GameConfig {
        board: BoardType::Mini,
        dice_per_roll: 1,
        turns_limit: 2,
        ..GameConfig::default()
    };
    // Seat 0 hits Lucky Gate (card then extra turn) and walks onto the lane.
    // Seat 1 lands on Old Mill and buys it.
    let dice = ScriptedDice::new([2, 1, 3]);
    let mut game = Game::with_dice(config, &bots(2), dice).unwrap();
    game.play(&[GreedyPlayer, GreedyPlayer], &mut InstantAnimator)
        .unwrap();

    let mut stats = StatisticsAccumulator::new();
    stats.after(&game, Duration::from_millis(3));
    let stats = stats.stats;
    assert_eq!(stats.games, 1);
    assert_eq!(stats.total_turns, 2);
    assert_eq!(stats.total_rolls, 3);
    assert_eq!(stats.extra_turns.get("BRANCH_ENTRY"), Some(&1));
    assert_eq!(stats.bonus_entries, 1);
    assert_eq!(stats.purchases, 1);
    assert_eq!(stats.interrupts.get("CARD_DRAW(VENTURE)"), Some(&1));
    assert_eq!(stats.interrupts.get("CARD_DRAW(PROPERTY)"), Some(&1));

    let positions: Vec<_> = game
        .machine
        .roster()
        .players()
        .iter()
        .map(|player| player.location)
        .collect();
    assert_eq!(
        positions,
        vec![Location::OnBonusBranch(0), Location::OnMainLoop(3)]
    );
}

#[test]
fn sim_player_codes_seat_every_decider() {
    let players = parse_players("R:0.0,G").unwrap();
    let seats: Vec<_> = players
        .iter()
        .map(|player| Seat::new(player.label(), player.kind()))
        .collect();
    let config = GameConfig {
        turns_limit: 20,
        ..GameConfig::default()
    };
    let mut game = Game::new(config, &seats).unwrap();
    assert_eq!(game.play(&players, &mut InstantAnimator).unwrap(), 20);
}
