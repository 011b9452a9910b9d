use serde::{Deserialize, Serialize};

use crate::board::PathTopology;
use crate::game::roster::PlayerFlags;
use crate::types::Location;

/// Ordered tiles a token will visit for one roll, ending at its resting place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    steps: Vec<Location>,
}

impl MovePlan {
    pub fn steps(&self) -> &[Location] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Location> {
        self.steps.get(idx).copied()
    }

    pub fn destination(&self) -> Option<Location> {
        self.steps.last().copied()
    }

    pub fn visits_bonus_branch(&self) -> bool {
        self.steps.iter().any(Location::is_on_bonus_branch)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MovementPlanner<'a> {
    topology: &'a PathTopology,
}

impl<'a> MovementPlanner<'a> {
    pub fn new(topology: &'a PathTopology) -> Self {
        Self { topology }
    }

    pub fn plan(&self, from: Location, step_count: u32, flags: PlayerFlags) -> MovePlan {
        plan_movement(self.topology, from, step_count, flags)
    }
}

pub fn plan_movement(
    topology: &PathTopology,
    from: Location,
    step_count: u32,
    flags: PlayerFlags,
) -> MovePlan {
    let main_len = topology.main_len();
    let bonus_len = topology.bonus_len();
    let exit = topology.bonus_exit_main_index();

    let mut enter_branch =
        flags.branch_entry_next_roll && !from.is_on_bonus_branch() && bonus_len > 0;
    let mut steps = Vec::with_capacity((step_count as usize).min(256));
    let mut current = from;

    for _ in 0..step_count {
        current = match current {
            Location::OnMainLoop(_) if enter_branch => {
                enter_branch = false;
                Location::OnBonusBranch(0)
            }
            Location::OnMainLoop(idx) => Location::OnMainLoop((idx + 1) % main_len),
            Location::OnBonusBranch(idx) if idx + 1 < bonus_len => Location::OnBonusBranch(idx + 1),
            // Stepping off the last bonus tile lands on the exit tile of the main loop.
            Location::OnBonusBranch(_) => Location::OnMainLoop(exit),
        };
        tracing::trace!(step = steps.len() + 1, location = %current, "planned step");
        steps.push(current);
    }

    MovePlan { steps }
}
