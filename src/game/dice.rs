use std::collections::VecDeque;
use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const MAX_DICE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceArity {
    Single,
    Double,
}

impl DiceArity {
    pub fn count(self) -> usize {
        match self {
            DiceArity::Single => 1,
            DiceArity::Double => 2,
        }
    }

    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(DiceArity::Single),
            2 => Some(DiceArity::Double),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RollError {
    #[error("a roll needs at least one die")]
    NoDice,
    #[error("at most two dice may be rolled, got {0}")]
    TooManyDice(usize),
    #[error("die face {0} outside 1..=6")]
    FaceOutOfRange(u8),
}

/// One or two die faces. Construction, including deserialization, rejects
/// anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct RollResult {
    faces: SmallVec<[u8; MAX_DICE]>,
}

impl RollResult {
    pub fn new(faces: &[u8]) -> Result<Self, RollError> {
        if faces.is_empty() {
            return Err(RollError::NoDice);
        }
        if faces.len() > MAX_DICE {
            return Err(RollError::TooManyDice(faces.len()));
        }
        if let Some(face) = faces.iter().find(|face| !(1..=6).contains(*face)) {
            return Err(RollError::FaceOutOfRange(*face));
        }
        Ok(Self {
            faces: SmallVec::from_slice(faces),
        })
    }

    pub fn single(face: u8) -> Result<Self, RollError> {
        Self::new(&[face])
    }

    pub fn pair(first: u8, second: u8) -> Result<Self, RollError> {
        Self::new(&[first, second])
    }

    pub fn faces(&self) -> &[u8] {
        &self.faces
    }

    pub fn arity(&self) -> DiceArity {
        if self.faces.len() == MAX_DICE {
            DiceArity::Double
        } else {
            DiceArity::Single
        }
    }

    pub fn sum(&self) -> u32 {
        self.faces.iter().map(|&face| face as u32).sum()
    }

    /// Only a two-die roll can be a double.
    pub fn is_double(&self) -> bool {
        matches!(self.faces.as_slice(), [a, b] if a == b)
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.faces.as_slice() {
            [a, b] => write!(f, "{a}+{b}={}", self.sum()),
            _ => write!(f, "{}", self.sum()),
        }
    }
}

impl TryFrom<Vec<u8>> for RollResult {
    type Error = RollError;

    fn try_from(faces: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(&faces)
    }
}

impl From<RollResult> for Vec<u8> {
    fn from(roll: RollResult) -> Self {
        roll.faces.into_vec()
    }
}

pub trait DiceSource {
    fn roll(&mut self, arity: DiceArity) -> RollResult;
}

#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

impl DiceSource for RandomDice {
    fn roll(&mut self, arity: DiceArity) -> RollResult {
        let faces: SmallVec<[u8; MAX_DICE]> = (0..arity.count()).map(|_| self.roll_die()).collect();
        RollResult { faces }
    }
}

/// Replays a fixed list of faces. Once exhausted it counts 1..=6 in a cycle,
/// so two consecutive fallback faces never match.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
    fallback: u8,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces.into_iter().map(|face| face.clamp(1, 6)).collect(),
            fallback: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }

    fn next_face(&mut self) -> u8 {
        self.faces.pop_front().unwrap_or_else(|| {
            self.fallback = self.fallback % 6 + 1;
            self.fallback
        })
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, arity: DiceArity) -> RollResult {
        let faces: SmallVec<[u8; MAX_DICE]> =
            (0..arity.count()).map(|_| self.next_face()).collect();
        RollResult { faces }
    }
}
