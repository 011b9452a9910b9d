use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::types::{Branch, CardCategory, Location, TileCategory};

/// Blueprint of a tile before it is placed on a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub name: String,
    pub category: TileCategory,
}

impl TileSpec {
    pub fn new(name: impl Into<String>, category: TileCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: usize,
    pub name: String,
    pub category: TileCategory,
    pub branch: Branch,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("main loop must contain at least one tile")]
    EmptyMainLoop,
    #[error("tile {0:?} appears more than once")]
    DuplicateTile(String),
    #[error("bonus exit index {index} outside main loop of length {len}")]
    ExitOutOfRange { index: usize, len: usize },
    #[error("tile {name:?} has category {category} which is not allowed on the {branch} path")]
    MisplacedCategory {
        name: String,
        category: TileCategory,
        branch: Branch,
    },
    #[error("bonus branch has tiles but no main-loop tile enters it")]
    MissingBranchEntry,
    #[error("branch entry tile present but the bonus branch is empty")]
    OrphanBranchEntry,
    #[error("bonus exit index {index} points at {name:?}, which is {category} rather than a branch exit")]
    ExitNotBranchExit {
        index: usize,
        name: String,
        category: TileCategory,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardType {
    Standard,
    Mini,
}

impl Default for BoardType {
    fn default() -> Self {
        BoardType::Standard
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoardType::Standard => "STANDARD",
            BoardType::Mini => "MINI",
        };
        write!(f, "{label}")
    }
}

impl FromStr for BoardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(BoardType::Standard),
            "mini" => Ok(BoardType::Mini),
            _ => Err(format!("unknown board type: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoardTemplate {
    pub main_loop: Vec<TileSpec>,
    pub bonus_branch: Vec<TileSpec>,
    pub bonus_exit: usize,
}

impl BoardTemplate {
    pub fn standard() -> &'static BoardTemplate {
        &STANDARD_TEMPLATE
    }

    pub fn mini() -> &'static BoardTemplate {
        &MINI_TEMPLATE
    }

    pub fn for_board(board: BoardType) -> &'static BoardTemplate {
        match board {
            BoardType::Standard => Self::standard(),
            BoardType::Mini => Self::mini(),
        }
    }
}

/// The cyclic main loop plus the linear bonus branch ("Fortune Road").
#[derive(Debug, Clone)]
pub struct PathTopology {
    main_loop: Vec<Tile>,
    bonus_branch: Vec<Tile>,
    bonus_exit: usize,
    by_name: HashMap<String, Location>,
}

impl PathTopology {
    pub fn new(
        main_loop: Vec<TileSpec>,
        bonus_branch: Vec<TileSpec>,
        bonus_exit: usize,
    ) -> Result<Self, TopologyError> {
        if main_loop.is_empty() {
            return Err(TopologyError::EmptyMainLoop);
        }
        if bonus_exit >= main_loop.len() {
            return Err(TopologyError::ExitOutOfRange {
                index: bonus_exit,
                len: main_loop.len(),
            });
        }
        if let Some(name) = main_loop
            .iter()
            .chain(bonus_branch.iter())
            .map(|spec| spec.name.as_str())
            .duplicates()
            .next()
        {
            return Err(TopologyError::DuplicateTile(name.to_string()));
        }

        for spec in &main_loop {
            if matches!(spec.category, TileCategory::BranchNode) {
                return Err(misplaced(spec, Branch::Main));
            }
        }
        for spec in &bonus_branch {
            if matches!(
                spec.category,
                TileCategory::BranchEntry(_) | TileCategory::BranchExit | TileCategory::Start
            ) {
                return Err(misplaced(spec, Branch::Bonus));
            }
        }

        let has_entry = main_loop.iter().any(|spec| spec.category.is_branch_entry());
        match (has_entry, bonus_branch.is_empty()) {
            (false, false) => return Err(TopologyError::MissingBranchEntry),
            (true, true) => return Err(TopologyError::OrphanBranchEntry),
            _ => {}
        }
        let exit_tile = &main_loop[bonus_exit];
        if !bonus_branch.is_empty() && exit_tile.category != TileCategory::BranchExit {
            return Err(TopologyError::ExitNotBranchExit {
                index: bonus_exit,
                name: exit_tile.name.clone(),
                category: exit_tile.category,
            });
        }

        let main_len = main_loop.len();
        let main_loop = place(main_loop, Branch::Main, 0);
        let bonus_branch = place(bonus_branch, Branch::Bonus, main_len);

        let mut by_name = HashMap::with_capacity(main_loop.len() + bonus_branch.len());
        for (idx, tile) in main_loop.iter().enumerate() {
            by_name.insert(tile.name.clone(), Location::OnMainLoop(idx));
        }
        for (idx, tile) in bonus_branch.iter().enumerate() {
            by_name.insert(tile.name.clone(), Location::OnBonusBranch(idx));
        }

        Ok(Self {
            main_loop,
            bonus_branch,
            bonus_exit,
            by_name,
        })
    }

    pub fn from_template(template: &BoardTemplate) -> Result<Self, TopologyError> {
        Self::new(
            template.main_loop.clone(),
            template.bonus_branch.clone(),
            template.bonus_exit,
        )
    }

    pub fn build(board: BoardType) -> Result<Self, TopologyError> {
        Self::from_template(BoardTemplate::for_board(board))
    }

    pub fn main_len(&self) -> usize {
        self.main_loop.len()
    }

    pub fn bonus_len(&self) -> usize {
        self.bonus_branch.len()
    }

    /// Main-loop lookup; the index wraps around the loop.
    pub fn tile_at(&self, main_index: usize) -> &Tile {
        &self.main_loop[main_index % self.main_loop.len()]
    }

    pub fn bonus_tile_at(&self, bonus_index: usize) -> Option<&Tile> {
        self.bonus_branch.get(bonus_index)
    }

    pub fn tile_at_location(&self, location: Location) -> Option<&Tile> {
        match location {
            Location::OnMainLoop(idx) => self.main_loop.get(idx),
            Location::OnBonusBranch(idx) => self.bonus_tile_at(idx),
        }
    }

    pub fn classify_landing(&self, location: Location) -> Option<TileCategory> {
        self.tile_at_location(location).map(|tile| tile.category)
    }

    pub fn is_bonus_entry(&self, tile: &Tile) -> bool {
        tile.branch == Branch::Main && tile.category.is_branch_entry()
    }

    pub fn bonus_exit_main_index(&self) -> usize {
        self.bonus_exit
    }

    pub fn tile_by_name(&self, name: &str) -> Option<&Tile> {
        self.location_of(name)
            .and_then(|location| self.tile_at_location(location))
    }

    pub fn location_of(&self, name: &str) -> Option<Location> {
        self.by_name.get(name).copied()
    }

    pub fn branch_entries(&self) -> impl Iterator<Item = (usize, &Tile)> + '_ {
        self.main_loop
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.category.is_branch_entry())
    }

    pub fn main_loop(&self) -> &[Tile] {
        &self.main_loop
    }

    pub fn bonus_branch(&self) -> &[Tile] {
        &self.bonus_branch
    }
}

fn misplaced(spec: &TileSpec, branch: Branch) -> TopologyError {
    TopologyError::MisplacedCategory {
        name: spec.name.clone(),
        category: spec.category,
        branch,
    }
}

fn place(specs: Vec<TileSpec>, branch: Branch, first_id: usize) -> Vec<Tile> {
    specs
        .into_iter()
        .enumerate()
        .map(|(offset, spec)| Tile {
            id: first_id + offset,
            name: spec.name,
            category: spec.category,
            branch,
        })
        .collect()
}

static STANDARD_TEMPLATE: Lazy<BoardTemplate> = Lazy::new(|| {
    let mut main_loop: Vec<TileSpec> = (0..40)
        .map(|idx| TileSpec::new(format!("Street {idx}"), TileCategory::Normal))
        .collect();
    main_loop[0] = TileSpec::new("Start", TileCategory::Start);
    for idx in [5, 15, 25, 35] {
        main_loop[idx] = TileSpec::new(
            format!("Chance {idx}"),
            TileCategory::Card(CardCategory::Chance),
        );
    }
    for idx in [20, 30] {
        main_loop[idx] = TileSpec::new(
            format!("Venture {idx}"),
            TileCategory::Card(CardCategory::Venture),
        );
    }
    for idx in [3, 18, 27, 37] {
        main_loop[idx] = TileSpec::new(
            format!("Vacant Lot {idx}"),
            TileCategory::Card(CardCategory::Property),
        );
    }
    for idx in [10, 22, 33] {
        main_loop[idx] = TileSpec::new(format!("Exchange {idx}"), TileCategory::StockMarket);
    }
    main_loop[8] = TileSpec::new("Fortune Road Gate", TileCategory::BranchEntry(None));
    main_loop[12] = TileSpec::new("Fortune Road Exit", TileCategory::BranchExit);

    let bonus_branch = (1..=5)
        .map(|n| TileSpec::new(format!("Fortune Road {n}"), TileCategory::BranchNode))
        .collect();

    BoardTemplate {
        main_loop,
        bonus_branch,
        bonus_exit: 12,
    }
});

static MINI_TEMPLATE: Lazy<BoardTemplate> = Lazy::new(|| BoardTemplate {
    main_loop: vec![
        TileSpec::new("Start", TileCategory::Start),
        TileSpec::new("Market Row", TileCategory::Normal),
        TileSpec::new(
            "Lucky Gate",
            TileCategory::BranchEntry(Some(CardCategory::Venture)),
        ),
        TileSpec::new("Old Mill", TileCategory::Card(CardCategory::Property)),
        TileSpec::new("Harbor", TileCategory::Normal),
        TileSpec::new("Lucky Exit", TileCategory::BranchExit),
        TileSpec::new("Bourse", TileCategory::StockMarket),
        TileSpec::new("Chapel", TileCategory::Card(CardCategory::Chance)),
        TileSpec::new("Bridge", TileCategory::Normal),
        TileSpec::new("Orchard", TileCategory::Card(CardCategory::Property)),
        TileSpec::new("Tower", TileCategory::Normal),
        TileSpec::new("Crossroads", TileCategory::Card(CardCategory::Chance)),
    ],
    bonus_branch: vec![
        TileSpec::new("Lucky Lane 1", TileCategory::BranchNode),
        TileSpec::new("Lucky Lane 2", TileCategory::Card(CardCategory::Chance)),
        TileSpec::new("Lucky Lane 3", TileCategory::BranchNode),
    ],
    bonus_exit: 5,
});

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, category: TileCategory) -> TileSpec {
        TileSpec::new(name, category)
    }

    #[test]
    fn builtin_boards_are_valid() {
        let standard = PathTopology::build(BoardType::Standard).unwrap();
        assert_eq!(standard.main_len(), 40);
        assert_eq!(standard.bonus_len(), 5);
        assert_eq!(standard.bonus_exit_main_index(), 12);
        assert!(standard.is_bonus_entry(standard.tile_at(8)));

        let mini = PathTopology::build(BoardType::Mini).unwrap();
        assert_eq!(mini.main_len(), 12);
        assert_eq!(mini.branch_entries().count(), 1);
    }

    #[test]
    fn main_lookup_wraps_and_bonus_lookup_does_not() {
        let topology = PathTopology::build(BoardType::Standard).unwrap();
        assert_eq!(topology.tile_at(40).name, "Start");
        assert_eq!(topology.tile_at(41).id, 1);
        assert!(topology.bonus_tile_at(4).is_some());
        assert!(topology.bonus_tile_at(5).is_none());
    }

    #[test]
    fn tiles_are_found_by_name_and_classified() {
        let topology = PathTopology::build(BoardType::Standard).unwrap();
        let location = topology.location_of("Fortune Road 3").unwrap();
        assert_eq!(location, Location::OnBonusBranch(2));
        assert_eq!(
            topology.classify_landing(location),
            Some(TileCategory::BranchNode)
        );
        assert_eq!(
            topology.classify_landing(Location::OnMainLoop(10)),
            Some(TileCategory::StockMarket)
        );
        let bonus = topology.tile_by_name("Fortune Road 1").unwrap();
        assert_eq!(bonus.branch, Branch::Bonus);
        assert_eq!(bonus.id, 40);
        assert!(!topology.is_bonus_entry(bonus));
    }

    #[test]
    fn rejects_empty_main_loop() {
        let err = PathTopology::new(vec![], vec![], 0).unwrap_err();
        assert_eq!(err, TopologyError::EmptyMainLoop);
    }

    #[test]
    fn rejects_tile_shared_between_paths() {
        let err = PathTopology::new(
            vec![
                spec("Start", TileCategory::Start),
                spec("Gate", TileCategory::BranchEntry(None)),
            ],
            vec![spec("Gate", TileCategory::BranchNode)],
            0,
        )
        .unwrap_err();
        assert_eq!(err, TopologyError::DuplicateTile("Gate".into()));
    }

    #[test]
    fn rejects_exit_outside_loop() {
        let err = PathTopology::new(vec![spec("Start", TileCategory::Start)], vec![], 3)
            .unwrap_err();
        assert!(matches!(err, TopologyError::ExitOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn rejects_entry_tile_on_bonus_branch() {
        let err = PathTopology::new(
            vec![
                spec("Start", TileCategory::Start),
                spec("Gate", TileCategory::BranchEntry(None)),
            ],
            vec![spec("Inner Gate", TileCategory::BranchEntry(None))],
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TopologyError::MisplacedCategory {
                branch: Branch::Bonus,
                ..
            }
        ));
    }

    #[test]
    fn bonus_branch_and_entry_tiles_come_together() {
        let missing = PathTopology::new(
            vec![spec("Start", TileCategory::Start)],
            vec![spec("Lane", TileCategory::BranchNode)],
            0,
        )
        .unwrap_err();
        assert_eq!(missing, TopologyError::MissingBranchEntry);

        let orphan = PathTopology::new(
            vec![
                spec("Start", TileCategory::Start),
                spec("Gate", TileCategory::BranchEntry(None)),
            ],
            vec![],
            0,
        )
        .unwrap_err();
        assert_eq!(orphan, TopologyError::OrphanBranchEntry);
    }

    #[test]
    fn bonus_exit_must_point_at_an_exit_tile() {
        let main = || {
            vec![
                spec("Start", TileCategory::Start),
                spec("Gate", TileCategory::BranchEntry(None)),
                spec("Exit", TileCategory::BranchExit),
            ]
        };
        let err = PathTopology::new(main(), vec![spec("Lane", TileCategory::BranchNode)], 1)
            .unwrap_err();
        assert_eq!(
            err,
            TopologyError::ExitNotBranchExit {
                index: 1,
                name: "Gate".into(),
                category: TileCategory::BranchEntry(None),
            }
        );
        let topology =
            PathTopology::new(main(), vec![spec("Lane", TileCategory::BranchNode)], 2).unwrap();
        assert_eq!(topology.bonus_exit_main_index(), 2);

        // Without a bonus branch the exit index is never used.
        assert!(PathTopology::new(vec![spec("Start", TileCategory::Start)], vec![], 0).is_ok());
    }

    #[test]
    fn board_type_parses_case_insensitively() {
        assert_eq!("mini".parse::<BoardType>().unwrap(), BoardType::Mini);
        assert_eq!("STANDARD".parse::<BoardType>().unwrap(), BoardType::Standard);
        assert!("huge".parse::<BoardType>().is_err());
    }
}
