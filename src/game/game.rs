use uuid::Uuid;

use crate::board::{PathTopology, TopologyError};
use crate::game::dice::{DiceSource, RandomDice};
use crate::game::interrupt::InterruptGateway;
use crate::game::roster::{PlayerRoster, PlayerState, RosterError};
use crate::game::state::{
    ConfigError, GameConfig, PendingInterrupt, StepOutcome, TurnError, TurnEvent, TurnMachine,
    TurnState,
};
use crate::players::BasePlayer;
use crate::types::{InterruptOutcome, Location, PlayerId, PlayerKind};

/// Upper bound on rolls per completed turn before a game is cut short.
const ROLL_BUDGET_PER_TURN: u32 = 16;

/// Presentation-side mover. Called once per planned tile.
pub trait Animator {
    fn animate_to(&mut self, player: &PlayerState, location: Location);
}

/// Headless runs: every step finishes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn animate_to(&mut self, player: &PlayerState, location: Location) {
        tracing::trace!(player = %player.id, %location, "animate");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error("{seats} seats but {deciders} deciders")]
    SeatMismatch { seats: usize, deciders: usize },
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub name: String,
    pub kind: PlayerKind,
}

impl Seat {
    pub fn new(name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

enum Command {
    RequestRoll,
    Roll,
    FinishStep(Option<Location>),
    Resolve(PendingInterrupt),
    Wait,
}

/// A full game: the turn machine plus the dice and an event log.
pub struct Game<D: DiceSource = RandomDice> {
    pub id: Uuid,
    pub config: GameConfig,
    pub machine: TurnMachine,
    pub events: Vec<TurnEvent>,
    pub rolls: u32,
    dice: D,
}

impl Game<RandomDice> {
    pub fn new(config: GameConfig, seats: &[Seat]) -> Result<Self, GameError> {
        let dice = RandomDice::seeded(config.seed);
        Self::with_dice(config, seats, dice)
    }
}

impl<D: DiceSource> Game<D> {
    pub fn with_dice(config: GameConfig, seats: &[Seat], dice: D) -> Result<Self, GameError> {
        let topology = PathTopology::build(config.board)?;
        let players = seats
            .iter()
            .enumerate()
            .map(|(idx, seat)| PlayerState::new(PlayerId(idx as u32), seat.name.clone(), seat.kind))
            .collect();
        let roster = PlayerRoster::new(players)?;
        let machine = TurnMachine::new(
            topology,
            roster,
            InterruptGateway::new(),
            config.normal_arity()?,
        );
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            machine,
            events: Vec::new(),
            rolls: 0,
            dice,
        })
    }

    pub fn turns(&self) -> u32 {
        self.machine.turns_completed()
    }

    pub fn is_over(&self) -> bool {
        let limit = self.config.turns_limit;
        self.turns() >= limit || self.rolls >= limit.saturating_mul(ROLL_BUDGET_PER_TURN)
    }

    /// Plays until the turn limit. `players[i]` decides for seat `i`.
    pub fn play<P: BasePlayer, A: Animator>(
        &mut self,
        players: &[P],
        animator: &mut A,
    ) -> Result<u32, GameError> {
        let seats = self.machine.roster().len();
        if players.len() != seats {
            return Err(GameError::SeatMismatch {
                seats,
                deciders: players.len(),
            });
        }
        while !self.is_over() {
            self.play_tick(players, animator)?;
        }
        tracing::info!(game = %self.id, turns = self.turns(), rolls = self.rolls, "game finished");
        Ok(self.turns())
    }

    /// Issues the one command the machine is waiting for.
    pub fn play_tick<P: BasePlayer, A: Animator>(
        &mut self,
        players: &[P],
        animator: &mut A,
    ) -> Result<StepOutcome, GameError> {
        let command = match self.machine.state() {
            TurnState::Idle => Command::RequestRoll,
            TurnState::AwaitingRoll => Command::Roll,
            TurnState::Resolving(_) => Command::FinishStep(self.machine.pending_animation()),
            TurnState::AwaitingInterrupt(pending) => Command::Resolve(*pending),
            TurnState::ExtraTurnGranted(_) | TurnState::TurnComplete => Command::Wait,
        };

        let outcome = match command {
            Command::RequestRoll => self.machine.request_roll()?,
            Command::Roll => {
                let roll = self.dice.roll(self.machine.dice_arity());
                self.rolls += 1;
                self.machine.submit_roll(roll)?
            }
            Command::FinishStep(target) => {
                if let Some(location) = target {
                    animator.animate_to(self.machine.current_player(), location);
                }
                self.machine.step_completed()?
            }
            Command::Resolve(pending) => {
                let seat = self.machine.roster().current_index();
                let current = self.machine.current_player();
                let result = match players.get(seat) {
                    Some(decider) if pending.kind.is_purchase_prompt() => {
                        decider.decide(pending.kind, current)
                    }
                    _ => InterruptOutcome::Done,
                };
                self.machine.close_interrupt(pending.handle, result)?
            }
            Command::Wait => StepOutcome::default(),
        };
        self.events.extend(outcome.events.iter().cloned());
        Ok(outcome)
    }
}
