use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{BoardType, PathTopology};
use crate::types::{
    ExtraTurnReason, InterruptKind, InterruptOutcome, Location, PlayerId, TileCategory,
};

use super::{
    dice::{DiceArity, RollError, RollResult},
    interrupt::{InterruptError, InterruptGateway, InterruptHandle},
    movement::{MovePlan, MovementPlanner},
    roster::{PlayerRoster, PlayerState},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board: BoardType,
    pub dice_per_roll: u8,
    pub seed: u64,
    pub turns_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardType::Standard,
            dice_per_roll: 2,
            seed: 42,
            turns_limit: 200,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dice_per_roll must be 1 or 2, got {0}")]
    InvalidDice(u8),
}

impl GameConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(raw)?;
        config.normal_arity()?;
        Ok(config)
    }

    pub fn normal_arity(&self) -> Result<DiceArity, ConfigError> {
        DiceArity::from_count(self.dice_per_roll).ok_or(ConfigError::InvalidDice(self.dice_per_roll))
    }
}

/// Movement in progress: the plan and how far the token has got along it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolving {
    pub roll: RollResult,
    pub plan: MovePlan,
    pub next_step: usize,
    pub started_on_bonus: bool,
}

impl Resolving {
    pub fn steps_remaining(&self) -> usize {
        self.plan.len().saturating_sub(self.next_step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInterrupt {
    pub handle: InterruptHandle,
    pub kind: InterruptKind,
    /// Landing tile was also a branch entry; grant that extra turn on close.
    pub then_branch_entry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingRoll,
    Resolving(Resolving),
    AwaitingInterrupt(PendingInterrupt),
    ExtraTurnGranted(ExtraTurnReason),
    TurnComplete,
}

impl TurnState {
    pub fn label(&self) -> &'static str {
        match self {
            TurnState::Idle => "IDLE",
            TurnState::AwaitingRoll => "AWAITING_ROLL",
            TurnState::Resolving(_) => "RESOLVING",
            TurnState::AwaitingInterrupt(_) => "AWAITING_INTERRUPT",
            TurnState::ExtraTurnGranted(_) => "EXTRA_TURN_GRANTED",
            TurnState::TurnComplete => "TURN_COMPLETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    RollRequested {
        player: PlayerId,
        arity: DiceArity,
    },
    DiceRolled {
        player: PlayerId,
        roll: RollResult,
        steps: u32,
    },
    AnimateTo {
        player: PlayerId,
        location: Location,
    },
    Moved {
        player: PlayerId,
        location: Location,
    },
    PassedStart {
        player: PlayerId,
    },
    EnteredBonusBranch {
        player: PlayerId,
    },
    ExitedBonusBranch {
        player: PlayerId,
    },
    InterruptOpened {
        player: PlayerId,
        handle: InterruptHandle,
        kind: InterruptKind,
    },
    InterruptClosed {
        player: PlayerId,
        kind: InterruptKind,
        outcome: InterruptOutcome,
    },
    ExtraTurnGranted {
        player: PlayerId,
        reason: ExtraTurnReason,
    },
    TurnCompleted {
        player: PlayerId,
    },
    CurrentPlayerChanged {
        player: PlayerId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub events: Vec<TurnEvent>,
}

impl StepOutcome {
    fn push(&mut self, event: TurnEvent) {
        self.events.push(event);
    }

    pub fn animation_target(&self) -> Option<Location> {
        self.events.iter().rev().find_map(|event| match event {
            TurnEvent::AnimateTo { location, .. } => Some(*location),
            _ => None,
        })
    }

    pub fn opened_interrupt(&self) -> Option<(InterruptHandle, InterruptKind)> {
        self.events.iter().find_map(|event| match event {
            TurnEvent::InterruptOpened { handle, kind, .. } => Some((*handle, *kind)),
            _ => None,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("expected a {expected:?} roll, got {got:?}")]
    ArityMismatch { expected: DiceArity, got: DiceArity },
    #[error(transparent)]
    Roll(#[from] RollError),
    #[error(transparent)]
    Interrupt(#[from] InterruptError),
    #[error("no player with id {0}")]
    MissingPlayer(PlayerId),
}

/// Drives one player's turn at a time: roll, step-by-step movement, landing
/// effects, extra turns and the hand-off to the next seat.
///
/// The machine never waits on its own. Every suspension is a state, and it
/// only moves forward when a caller reports a roll, a finished animation
/// step or a closed interrupt.
#[derive(Debug)]
pub struct TurnMachine {
    topology: PathTopology,
    roster: PlayerRoster,
    gateway: InterruptGateway,
    normal_arity: DiceArity,
    state: TurnState,
    turns_completed: u32,
}

impl TurnMachine {
    pub fn new(
        topology: PathTopology,
        roster: PlayerRoster,
        gateway: InterruptGateway,
        normal_arity: DiceArity,
    ) -> Self {
        Self {
            topology,
            roster,
            gateway,
            normal_arity,
            state: TurnState::Idle,
            turns_completed: 0,
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TurnState::Idle)
    }

    pub fn can_roll(&self) -> bool {
        matches!(self.state, TurnState::AwaitingRoll)
    }

    pub fn topology(&self) -> &PathTopology {
        &self.topology
    }

    pub fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    /// Access for turn-change subscriptions.
    pub fn roster_mut(&mut self) -> &mut PlayerRoster {
        &mut self.roster
    }

    pub fn gateway(&self) -> &InterruptGateway {
        &self.gateway
    }

    /// External subsystems may close their interrupt here and let [`Self::poll`] resume.
    pub fn gateway_mut(&mut self) -> &mut InterruptGateway {
        &mut self.gateway
    }

    pub fn current_player(&self) -> &PlayerState {
        self.roster.current()
    }

    pub fn player(&self, id: PlayerId) -> Result<&PlayerState, TurnError> {
        self.roster
            .get(id)
            .map_err(|_| TurnError::MissingPlayer(id))
    }

    pub fn turns_completed(&self) -> u32 {
        self.turns_completed
    }

    /// Dice count the current player must roll next.
    pub fn dice_arity(&self) -> DiceArity {
        if self.roster.current().flags.single_die_next_roll {
            DiceArity::Single
        } else {
            self.normal_arity
        }
    }

    pub fn pending_animation(&self) -> Option<Location> {
        match &self.state {
            TurnState::Resolving(resolving) => resolving.plan.get(resolving.next_step),
            _ => None,
        }
    }

    pub fn open_interrupt(&self) -> Option<PendingInterrupt> {
        match self.state {
            TurnState::AwaitingInterrupt(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn request_roll(&mut self) -> Result<StepOutcome, TurnError> {
        if !self.is_idle() {
            return Err(self.reject("request a roll"));
        }
        let mut outcome = StepOutcome::default();
        outcome.push(TurnEvent::RollRequested {
            player: self.roster.current().id,
            arity: self.dice_arity(),
        });
        self.transition(TurnState::AwaitingRoll);
        Ok(outcome)
    }

    pub fn submit_roll(&mut self, roll: RollResult) -> Result<StepOutcome, TurnError> {
        if !self.can_roll() {
            return Err(self.reject("submit a roll"));
        }
        let expected = self.dice_arity();
        if roll.arity() != expected {
            tracing::warn!(?expected, got = ?roll.arity(), "roll with wrong number of dice refused");
            return Err(TurnError::ArityMismatch {
                expected,
                got: roll.arity(),
            });
        }

        let player = self.roster.current_mut();
        let flags = player.flags;
        player.take_single_die();
        player.take_branch_entry();
        let from = player.location;
        let id = player.id;

        let steps = roll.sum();
        let plan = MovementPlanner::new(&self.topology).plan(from, steps, flags);
        tracing::debug!(player = %id, %roll, %from, steps = plan.len(), "movement planned");

        let mut outcome = StepOutcome::default();
        outcome.push(TurnEvent::DiceRolled {
            player: id,
            roll: roll.clone(),
            steps,
        });

        let Some(first) = plan.get(0) else {
            self.complete_turn(&mut outcome);
            return Ok(outcome);
        };
        outcome.push(TurnEvent::AnimateTo {
            player: id,
            location: first,
        });
        self.transition(TurnState::Resolving(Resolving {
            roll,
            plan,
            next_step: 0,
            started_on_bonus: from.is_on_bonus_branch(),
        }));
        Ok(outcome)
    }

    /// The animation collaborator finished the step it was last asked for.
    pub fn step_completed(&mut self) -> Result<StepOutcome, TurnError> {
        let (location, next_target) = match &mut self.state {
            TurnState::Resolving(resolving) => {
                let Some(location) = resolving.plan.get(resolving.next_step) else {
                    return Err(TurnError::InvalidTransition {
                        state: "RESOLVING",
                        action: "complete a step past the end of the plan",
                    });
                };
                resolving.next_step += 1;
                (location, resolving.plan.get(resolving.next_step))
            }
            _ => return Err(self.reject("complete a movement step")),
        };

        let mut outcome = StepOutcome::default();
        let main_len = self.topology.main_len();
        let player = self.roster.current_mut();
        let id = player.id;
        let previous = std::mem::replace(&mut player.location, location);
        tracing::trace!(player = %id, %previous, %location, "step completed");

        outcome.push(TurnEvent::Moved {
            player: id,
            location,
        });
        match (previous, location) {
            (Location::OnMainLoop(a), Location::OnMainLoop(0)) if a + 1 == main_len => {
                outcome.push(TurnEvent::PassedStart { player: id });
            }
            (Location::OnMainLoop(_), Location::OnBonusBranch(_)) => {
                outcome.push(TurnEvent::EnteredBonusBranch { player: id });
            }
            (Location::OnBonusBranch(_), Location::OnMainLoop(_)) => {
                outcome.push(TurnEvent::ExitedBonusBranch { player: id });
            }
            _ => {}
        }

        if let Some(target) = next_target {
            outcome.push(TurnEvent::AnimateTo {
                player: id,
                location: target,
            });
            return Ok(outcome);
        }

        let (roll, mid_branch) = match &self.state {
            TurnState::Resolving(resolving) => (
                resolving.roll.clone(),
                resolving.started_on_bonus || resolving.plan.visits_bonus_branch(),
            ),
            _ => return Ok(outcome),
        };
        self.finish_movement(&roll, mid_branch, &mut outcome)?;
        Ok(outcome)
    }

    /// The card, purchase or stock subsystem is done with its interrupt.
    pub fn close_interrupt(
        &mut self,
        handle: InterruptHandle,
        result: InterruptOutcome,
    ) -> Result<StepOutcome, TurnError> {
        let TurnState::AwaitingInterrupt(pending) = self.state else {
            return Err(self.reject("close an interrupt"));
        };
        self.gateway.close(handle)?;
        let mut outcome = StepOutcome::default();
        self.resume_after_interrupt(pending, result, &mut outcome);
        Ok(outcome)
    }

    /// Resumes a turn whose interrupt was closed directly on the gateway.
    pub fn poll(&mut self) -> Result<StepOutcome, TurnError> {
        let mut outcome = StepOutcome::default();
        if let TurnState::AwaitingInterrupt(pending) = self.state {
            let still_open = self
                .gateway
                .active()
                .is_some_and(|(handle, _)| handle == pending.handle);
            if !still_open {
                self.resume_after_interrupt(pending, InterruptOutcome::Done, &mut outcome);
            }
        }
        Ok(outcome)
    }

    fn finish_movement(
        &mut self,
        roll: &RollResult,
        mid_branch: bool,
        outcome: &mut StepOutcome,
    ) -> Result<(), TurnError> {
        if roll.arity() == DiceArity::Double && roll.is_double() {
            self.grant_extra_turn(ExtraTurnReason::MatchingDice, outcome);
            return Ok(());
        }

        let landing = self.roster.current().location;
        let Some(category) = self.topology.classify_landing(landing) else {
            self.complete_turn(outcome);
            return Ok(());
        };
        let branch_entry = category.is_branch_entry()
            && !mid_branch
            && matches!(landing, Location::OnMainLoop(_));
        tracing::debug!(%landing, %category, branch_entry, "classifying landing");

        if let Some(card) = category.card() {
            self.open_gateway(InterruptKind::CardDraw(card), branch_entry, outcome)?;
        } else if branch_entry {
            self.roster.current_mut().grant_branch_entry();
            self.grant_extra_turn(ExtraTurnReason::BranchEntry, outcome);
        } else if matches!(category, TileCategory::StockMarket) {
            self.open_gateway(InterruptKind::StockMarket, false, outcome)?;
        } else {
            self.complete_turn(outcome);
        }
        Ok(())
    }

    fn open_gateway(
        &mut self,
        kind: InterruptKind,
        then_branch_entry: bool,
        outcome: &mut StepOutcome,
    ) -> Result<(), TurnError> {
        // Slot already taken: close out the turn, then report the error.
        let handle = match self.gateway.open(kind) {
            Ok(handle) => handle,
            Err(err) => {
                self.complete_turn(outcome);
                return Err(err.into());
            }
        };
        let player = self.roster.current().id;
        tracing::debug!(%player, %handle, %kind, then_branch_entry, "interrupt opened");
        outcome.push(TurnEvent::InterruptOpened {
            player,
            handle,
            kind,
        });
        self.transition(TurnState::AwaitingInterrupt(PendingInterrupt {
            handle,
            kind,
            then_branch_entry,
        }));
        Ok(())
    }

    fn resume_after_interrupt(
        &mut self,
        pending: PendingInterrupt,
        result: InterruptOutcome,
        outcome: &mut StepOutcome,
    ) {
        let player = self.roster.current().id;
        tracing::debug!(%player, kind = %pending.kind, %result, "interrupt closed");
        outcome.push(TurnEvent::InterruptClosed {
            player,
            kind: pending.kind,
            outcome: result,
        });
        if pending.then_branch_entry {
            self.roster.current_mut().grant_branch_entry();
            self.grant_extra_turn(ExtraTurnReason::BranchEntry, outcome);
        } else {
            self.complete_turn(outcome);
        }
    }

    fn grant_extra_turn(&mut self, reason: ExtraTurnReason, outcome: &mut StepOutcome) {
        let player = self.roster.current().id;
        self.transition(TurnState::ExtraTurnGranted(reason));
        tracing::info!(%player, %reason, "extra turn granted");
        outcome.push(TurnEvent::ExtraTurnGranted { player, reason });
        self.transition(TurnState::AwaitingRoll);
    }

    fn complete_turn(&mut self, outcome: &mut StepOutcome) {
        let finished = self.roster.current().id;
        self.transition(TurnState::TurnComplete);
        outcome.push(TurnEvent::TurnCompleted { player: finished });
        self.turns_completed += 1;

        let next = self.roster.advance().id;
        tracing::info!(%finished, %next, turn = self.turns_completed, "turn passed");
        outcome.push(TurnEvent::CurrentPlayerChanged { player: next });
        self.transition(TurnState::Idle);
    }

    fn transition(&mut self, next: TurnState) {
        tracing::debug!(
            player = %self.roster.current().id,
            from = self.state.label(),
            to = next.label(),
            "turn transition"
        );
        self.state = next;
    }

    fn reject(&self, action: &'static str) -> TurnError {
        let state = self.state.label();
        tracing::warn!(state, action, "rejected turn command");
        TurnError::InvalidTransition { state, action }
    }
}
