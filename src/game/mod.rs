pub mod dice;
pub mod game;
pub mod interrupt;
pub mod movement;
pub mod roster;
pub mod state;

pub use dice::{DiceArity, DiceSource, RandomDice, RollError, RollResult, ScriptedDice};
pub use game::{Animator, Game, GameError, InstantAnimator, Seat};
pub use interrupt::{InterruptError, InterruptGateway, InterruptHandle};
pub use movement::{MovePlan, MovementPlanner, plan_movement};
pub use roster::{ObserverId, PlayerFlags, PlayerRoster, PlayerState, RosterError};
pub use state::{
    ConfigError, GameConfig, PendingInterrupt, Resolving, StepOutcome, TurnError, TurnEvent,
    TurnMachine, TurnState,
};
