// Player valuation table: expected auction prices and tiers.
//
// Entries come from two sources, a local auction-values CSV (columns
// Player, Value, Tier, with values formatted like "$42") and the backend's
// /player_lookup endpoint. Both feed the same name-keyed table; the later
// insert wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Coarse valuation bucket assigned to a player independent of the draft.
///
/// Ranked tiers sort ascending; `NotAvailable` sorts after every ranked tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Ranked(u32),
    #[default]
    NotAvailable,
}

impl Tier {
    /// Parse a tier label. Numeric labels (including float-formatted ones
    /// like `"3.0"`) become `Ranked`; blanks, `"N/A"`, `"nan"` and anything
    /// else become `NotAvailable`.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if let Ok(n) = trimmed.parse::<u32>() {
            return Tier::Ranked(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Tier::Ranked(f as u32),
            _ => Tier::NotAvailable,
        }
    }

    pub fn from_number(n: f64) -> Self {
        if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
            Tier::Ranked(n as u32)
        } else {
            Tier::NotAvailable
        }
    }

    pub fn label(&self) -> String {
        match self {
            Tier::Ranked(n) => n.to_string(),
            Tier::NotAvailable => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Ranked(n) => write!(f, "{n}"),
            Tier::NotAvailable => write!(f, "N/A"),
        }
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        Tier::parse(&s)
    }
}

impl From<Tier> for String {
    fn from(tier: Tier) -> Self {
        tier.label()
    }
}

// ---------------------------------------------------------------------------
// ValuationEntry
// ---------------------------------------------------------------------------

/// Expected auction price and tier for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEntry {
    pub player_name: String,
    pub expected_price: f64,
    #[serde(default)]
    pub tier: Tier,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// ValuationTable
// ---------------------------------------------------------------------------

/// Name-keyed valuation lookup.
///
/// Keys are normalized (trimmed, lower-cased) so lookups are
/// case-insensitive. An alias map translates draft-platform spellings into
/// the valuation source's spelling before the lookup (e.g. `AJ Brown` ->
/// `A.J. Brown`).
#[derive(Debug, Clone, Default)]
pub struct ValuationTable {
    entries: HashMap<String, ValuationEntry>,
    aliases: HashMap<String, String>,
}

impl ValuationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table that resolves names through `aliases`.
    pub fn with_aliases(aliases: &HashMap<String, String>) -> Self {
        let aliases = aliases
            .iter()
            .map(|(from, to)| (normalize_name(from), normalize_name(to)))
            .collect();
        ValuationTable {
            entries: HashMap::new(),
            aliases,
        }
    }

    /// Insert an entry. A second entry for the same (normalized) name
    /// replaces the first.
    pub fn insert(&mut self, entry: ValuationEntry) {
        self.entries.insert(normalize_name(&entry.player_name), entry);
    }

    /// Look up a player by the name the draft platform reports.
    ///
    /// The direct name is tried first, then its alias.
    pub fn lookup(&self, player_name: &str) -> Option<&ValuationEntry> {
        let key = normalize_name(player_name);
        self.entries.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|aliased| self.entries.get(aliased))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<ValuationEntry> for ValuationTable {
    fn extend<I: IntoIterator<Item = ValuationEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse a dollar amount such as `"$42"`, `"42"`, `" $1,050.5 "`.
pub fn parse_money(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// Auction-values CSV row. Extra columns are ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawValuationRow {
    #[serde(alias = "Name", alias = "PLAYER NAME")]
    Player: String,
    #[serde(alias = "AAV", alias = "$")]
    Value: String,
    #[serde(default, alias = "TIERS")]
    Tier: Option<String>,
}

/// Load valuation entries from a CSV file on disk.
pub fn load_csv(path: &Path) -> Result<Vec<ValuationEntry>, ValuationError> {
    let path_str = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|source| ValuationError::Io {
        path: path_str.clone(),
        source,
    })?;
    load_csv_from_reader(file, &path_str)
}

/// Load valuation entries from any reader. Rows whose value cannot be parsed
/// are skipped with a warning; rows with a blank player name are dropped.
pub fn load_csv_from_reader<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<ValuationEntry>, ValuationError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut entries = Vec::new();

    for result in rdr.deserialize::<RawValuationRow>() {
        let row = result.map_err(|source| ValuationError::Csv {
            path: source_name.to_string(),
            source,
        })?;

        if row.Player.is_empty() {
            continue;
        }

        let Some(expected_price) = parse_money(&row.Value) else {
            warn!(
                "Skipping {} in {}: unparseable value {:?}",
                row.Player, source_name, row.Value
            );
            continue;
        };

        entries.push(ValuationEntry {
            player_name: row.Player,
            expected_price,
            tier: row.Tier.as_deref().map(Tier::parse).unwrap_or_default(),
        });
    }

    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
