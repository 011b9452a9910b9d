use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CardCategory {
    Chance,
    Venture,
    Property,
}

/// What landing on a tile means. Assigned once when the board is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCategory {
    Start,
    Normal,
    Card(CardCategory),
    StockMarket,
    /// Main-loop tile that opens the bonus branch. May also draw a card.
    BranchEntry(Option<CardCategory>),
    BranchNode,
    BranchExit,
}

impl TileCategory {
    pub fn card(&self) -> Option<CardCategory> {
        match self {
            TileCategory::Card(card) => Some(*card),
            TileCategory::BranchEntry(card) => *card,
            _ => None,
        }
    }

    pub fn is_branch_entry(&self) -> bool {
        matches!(self, TileCategory::BranchEntry(_))
    }
}

impl fmt::Display for TileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileCategory::Start => write!(f, "START"),
            TileCategory::Normal => write!(f, "NORMAL"),
            TileCategory::Card(card) => write!(f, "CARD({card})"),
            TileCategory::StockMarket => write!(f, "STOCK_MARKET"),
            TileCategory::BranchEntry(None) => write!(f, "BRANCH_ENTRY"),
            TileCategory::BranchEntry(Some(card)) => write!(f, "BRANCH_ENTRY({card})"),
            TileCategory::BranchNode => write!(f, "BRANCH_NODE"),
            TileCategory::BranchExit => write!(f, "BRANCH_EXIT"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Branch {
    Main,
    Bonus,
}

/// Where a token rests: an index into one of the two paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    OnMainLoop(usize),
    OnBonusBranch(usize),
}

impl Location {
    pub fn branch(&self) -> Branch {
        match self {
            Location::OnMainLoop(_) => Branch::Main,
            Location::OnBonusBranch(_) => Branch::Bonus,
        }
    }

    pub fn is_on_bonus_branch(&self) -> bool {
        matches!(self, Location::OnBonusBranch(_))
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::OnMainLoop(0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::OnMainLoop(idx) => write!(f, "main[{idx}]"),
            Location::OnBonusBranch(idx) => write!(f, "bonus[{idx}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterruptKind {
    CardDraw(CardCategory),
    StockMarket,
}

impl InterruptKind {
    /// Interrupts that end in a buy-or-decline decision by the seated player.
    pub fn is_purchase_prompt(&self) -> bool {
        matches!(
            self,
            InterruptKind::CardDraw(CardCategory::Property) | InterruptKind::StockMarket
        )
    }
}

impl fmt::Display for InterruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterruptKind::CardDraw(card) => write!(f, "CARD_DRAW({card})"),
            InterruptKind::StockMarket => write!(f, "STOCK_MARKET"),
        }
    }
}

/// How an external subsystem finished an interrupt. Opaque to turn flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InterruptOutcome {
    Done,
    Purchased,
    Declined,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtraTurnReason {
    MatchingDice,
    BranchEntry,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn branch_entry_can_carry_a_card() {
        let plain = TileCategory::BranchEntry(None);
        let carded = TileCategory::BranchEntry(Some(CardCategory::Venture));
        assert!(plain.is_branch_entry());
        assert_eq!(plain.card(), None);
        assert_eq!(carded.card(), Some(CardCategory::Venture));
        assert_eq!(TileCategory::StockMarket.card(), None);
    }

    #[test]
    fn card_categories_are_enumerable() {
        let all: Vec<_> = CardCategory::iter().collect();
        assert_eq!(
            all,
            vec![
                CardCategory::Chance,
                CardCategory::Venture,
                CardCategory::Property
            ]
        );
    }

    #[test]
    fn enums_parse_from_screaming_snake_case() {
        assert_eq!(
            CardCategory::from_str("VENTURE").unwrap(),
            CardCategory::Venture
        );
        assert_eq!(
            InterruptOutcome::from_str("DECLINED").unwrap(),
            InterruptOutcome::Declined
        );
        assert_eq!(ExtraTurnReason::MatchingDice.to_string(), "MATCHING_DICE");
    }
}
