// Wire types for the draft backend.
//
// The backend sanitizes its numbers into strings before sending them, so
// nearly every numeric field may arrive as a JSON number, a numeric string,
// "nan", "N/A" or null. `LooseNumber` absorbs all of those.
//
// Every payload round-trips through serde_json so it can also be written to
// and read back from the snapshot cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::draft::pick::{Pick, Position};
use crate::valuation::table::{parse_money, Tier, ValuationEntry};

// ---------------------------------------------------------------------------
// LooseNumber
// ---------------------------------------------------------------------------

/// A number that may have been stringified, or may be missing entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LooseNumber(pub Option<f64>);

impl LooseNumber {
    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn or_zero(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl<'de> Deserialize<'de> for LooseNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(LooseNumber(loose_f64(&value)))
    }
}

fn loose_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        serde_json::Value::String(s) => parse_money(s),
        _ => None,
    }
}

fn loose_tier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tier, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(Tier::from_number).unwrap_or_default(),
        serde_json::Value::String(s) => Tier::parse(&s),
        _ => Tier::NotAvailable,
    })
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// One pick as the draft platform reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPick {
    #[serde(default)]
    pub pick_no: u32,
    #[serde(default)]
    pub draft_slot: u32,
    #[serde(default)]
    pub metadata: RawPickMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPickMetadata {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub position: String,
    /// Auction amount, usually a string like `"42"`.
    #[serde(default)]
    pub amount: LooseNumber,
}

impl From<RawPick> for Pick {
    fn from(raw: RawPick) -> Self {
        let meta = raw.metadata;
        let player_name = format!("{} {}", meta.first_name.trim(), meta.last_name.trim())
            .trim()
            .to_string();
        let price = meta
            .amount
            .value()
            .filter(|a| *a >= 0.0)
            .map(|a| a.round() as u32)
            .unwrap_or(0);
        Pick {
            pick_no: raw.pick_no,
            draft_slot: raw.draft_slot,
            player_name,
            position: Position::from_str_pos(&meta.position),
            price,
        }
    }
}

/// Picks arrive either as a bare list or wrapped in `{"picks": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PicksEnvelope {
    Bare(Vec<RawPick>),
    Wrapped { picks: Vec<RawPick> },
}

impl PicksEnvelope {
    pub fn into_picks(self) -> Vec<RawPick> {
        match self {
            PicksEnvelope::Bare(picks) | PicksEnvelope::Wrapped { picks } => picks,
        }
    }
}

// ---------------------------------------------------------------------------
// Player lookup
// ---------------------------------------------------------------------------

/// Body of a player-lookup request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLookupRequest<'a> {
    pub players: &'a [String],
}

/// One valuation row returned by the player lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawValuation {
    #[serde(alias = "Player", alias = "player_name")]
    pub name: String,
    #[serde(default, alias = "Value", alias = "expected_value")]
    pub expected_price: LooseNumber,
    #[serde(default, alias = "Tier", deserialize_with = "loose_tier")]
    pub tier: Tier,
}

impl RawValuation {
    /// Convert into a table entry; rows without a usable price are dropped.
    pub fn into_entry(self) -> Option<ValuationEntry> {
        let expected_price = self.expected_price.value()?;
        Some(ValuationEntry {
            player_name: self.name,
            expected_price,
            tier: self.tier,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LookupEnvelope {
    Bare(Vec<RawValuation>),
    Wrapped { players: Vec<RawValuation> },
}

impl LookupEnvelope {
    pub fn into_rows(self) -> Vec<RawValuation> {
        match self {
            LookupEnvelope::Bare(rows) | LookupEnvelope::Wrapped { players: rows } => rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Server-side inflation
// ---------------------------------------------------------------------------

/// Request body for the inflation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftIdRequest<'a> {
    pub draft_id: &'a str,
}

/// Numbers keyed by position, then by tier label.
pub type NestedNumbers = BTreeMap<String, BTreeMap<String, LooseNumber>>;

/// Inflation as computed by the backend. Ratios are fractions, not percent;
/// DOE and tier costs are dollars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InflationPayload {
    #[serde(default)]
    pub overall_inflation: LooseNumber,
    #[serde(default)]
    pub positional_inflation: BTreeMap<String, LooseNumber>,
    #[serde(default, deserialize_with = "lenient_nested")]
    pub tiered_inflation: NestedNumbers,
    #[serde(default, deserialize_with = "lenient_nested")]
    pub picks_per_tier: NestedNumbers,
    #[serde(default)]
    pub total_picks: BTreeMap<String, LooseNumber>,
    #[serde(default, alias = "average_tier_costs", deserialize_with = "lenient_nested")]
    pub avg_tier_costs: NestedNumbers,
    #[serde(default, deserialize_with = "lenient_nested")]
    pub doe_values: NestedNumbers,
}

impl InflationPayload {
    /// Overall inflation as a percentage.
    pub fn overall_percent(&self) -> Option<f64> {
        self.overall_inflation.value().map(|f| f * 100.0)
    }
}

/// Accept `{pos: {tier: number}}`. Any other shape (the backend has sent
/// lists here) decodes as empty rather than failing the whole payload.
fn lenient_nested<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NestedNumbers, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Object(outer) = value else {
        return Ok(NestedNumbers::new());
    };
    Ok(outer
        .into_iter()
        .filter_map(|(key, inner)| match inner {
            serde_json::Value::Object(inner) => Some((
                key,
                inner
                    .iter()
                    .map(|(tier, v)| (tier.clone(), LooseNumber(loose_f64(v))))
                    .collect(),
            )),
            _ => None,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Team breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRosterPlayer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub amount: LooseNumber,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    #[serde(default, rename = "totalSpend", alias = "total_spend")]
    pub total_spend: Option<LooseNumber>,
    #[serde(default, rename = "remainingBudget", alias = "remaining_budget")]
    pub remaining_budget: Option<LooseNumber>,
    #[serde(default)]
    pub starters: Vec<RawRosterPlayer>,
    #[serde(default)]
    pub bench: Vec<RawRosterPlayer>,
}

/// Team breakdown keyed by draft slot (`"1"`, `"2"`, ...).
pub type TeamBreakdownPayload = BTreeMap<String, RawTeam>;

// ---------------------------------------------------------------------------
// Scatter / regression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPositionRegression {
    #[serde(default)]
    pub r2: LooseNumber,
    #[serde(default)]
    pub cost_of_waiting: BTreeMap<String, LooseNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterPayload {
    #[serde(default)]
    pub r2_values: BTreeMap<String, RawPositionRegression>,
}
