// Individual pick representation and football positions.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Football positions as reported by the draft platform.
///
/// Variant order is the display order used by every table; `Other` sorts
/// last so IDP or unknown labels never push the standard positions around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
    Other(String),
}

impl Position {
    /// The six positions every aggregation pre-fills, in display order.
    pub const STANDARD: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DEF,
    ];

    /// Positions that get a price-vs-pick regression.
    pub const SKILL: [Position; 4] = [Position::QB, Position::RB, Position::WR, Position::TE];

    /// Parse a position string. Never fails: unrecognised labels are kept
    /// (upper-cased) in `Other`.
    ///
    /// `D`, `DST` and `D/ST` normalize to `DEF`; `PK` normalizes to `K`.
    pub fn from_str_pos(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "QB" => Position::QB,
            "RB" => Position::RB,
            "WR" => Position::WR,
            "TE" => Position::TE,
            "K" | "PK" => Position::K,
            "DEF" | "D" | "DST" | "D/ST" => Position::DEF,
            _ => Position::Other(upper),
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
            Position::Other(label) => label.as_str(),
        }
    }

    /// Whether a player at this position can fill the FLEX starter slot.
    pub fn is_flex_eligible(&self) -> bool {
        matches!(self, Position::RB | Position::WR | Position::TE)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Position::from_str_pos(&s)
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.display_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Pick
// ---------------------------------------------------------------------------

/// A single completed auction pick.
///
/// Picks are immutable once received; every poll replaces the whole list for
/// a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    /// Sequential pick number (1-indexed).
    pub pick_no: u32,
    /// Draft slot of the team that won the player (1-indexed).
    pub draft_slot: u32,
    /// Full player name, `first last`.
    pub player_name: String,
    pub position: Position,
    /// Auction price paid.
    pub price: u32,
}

impl Pick {
    pub fn price_f64(&self) -> f64 {
        f64::from(self.price)
    }
}

/// Resolve the display name for a draft slot: the configured draft order
/// entry when present and non-blank, otherwise `Team {slot}`.
pub fn team_name_for_slot(slot: u32, draft_order: &[String]) -> String {
    slot.checked_sub(1)
        .and_then(|idx| draft_order.get(idx as usize))
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Team {slot}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
