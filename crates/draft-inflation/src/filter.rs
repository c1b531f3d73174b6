// Client-side pick filters.
//
// Set filters are OR within a field and AND across fields. An empty set
// passes everything. Numeric ranges are inclusive; a range sitting at its
// default bounds is inactive and passes every row, including rows that have
// no value for that field.

use std::collections::BTreeSet;

use crate::config::{FilterDefaults, RangeBounds};
use crate::draft::pick::Position;
use crate::valuation::inflation::AnnotatedPick;
use crate::valuation::table::Tier;

// ---------------------------------------------------------------------------
// NumericRange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    default_min: f64,
    default_max: f64,
}

impl NumericRange {
    pub fn new(bounds: RangeBounds) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
            default_min: bounds.min,
            default_max: bounds.max,
        }
    }

    pub fn is_active(&self) -> bool {
        self.min != self.default_min || self.max != self.default_max
    }

    /// Set both bounds; an inverted pair is swapped.
    pub fn set(&mut self, min: f64, max: f64) {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        self.min = min;
        self.max = max;
    }

    /// Nudge the lower bound, never past the upper.
    pub fn shift_min(&mut self, delta: f64) {
        self.min = (self.min + delta).min(self.max);
    }

    /// Nudge the upper bound, never below the lower.
    pub fn shift_max(&mut self, delta: f64) {
        self.max = (self.max + delta).max(self.min);
    }

    pub fn contains(&self, value: Option<f64>) -> bool {
        if !self.is_active() {
            return true;
        }
        value.is_some_and(|v| v >= self.min && v <= self.max)
    }

    pub fn reset(&mut self) {
        self.min = self.default_min;
        self.max = self.default_max;
    }
}

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub teams: BTreeSet<String>,
    pub positions: BTreeSet<Position>,
    pub tiers: BTreeSet<Tier>,
    pub price: NumericRange,
    pub expected_price: NumericRange,
    pub inflation: NumericRange,
    pub player_text: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(&FilterDefaults::default())
    }
}

impl FilterState {
    pub fn new(defaults: &FilterDefaults) -> Self {
        Self {
            teams: BTreeSet::new(),
            positions: BTreeSet::new(),
            tiers: BTreeSet::new(),
            price: NumericRange::new(defaults.price),
            expected_price: NumericRange::new(defaults.expected_price),
            inflation: NumericRange::new(defaults.inflation),
            player_text: String::new(),
        }
    }

    pub fn matches(&self, pick: &AnnotatedPick) -> bool {
        if !self.teams.is_empty() && !self.teams.contains(&pick.team_name) {
            return false;
        }
        if !self.positions.is_empty() && !self.positions.contains(&pick.pick.position) {
            return false;
        }
        if !self.tiers.is_empty() && !self.tiers.contains(&pick.tier) {
            return false;
        }
        if !self.price.contains(Some(pick.pick.price_f64())) {
            return false;
        }
        if !self.expected_price.contains(pick.expected_price) {
            return false;
        }
        if !self.inflation.contains(pick.inflation) {
            return false;
        }
        let needle = self.player_text.trim();
        needle.is_empty()
            || pick
                .pick
                .player_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
    }

    /// Filter a pick list, preserving order.
    pub fn apply<'a>(&self, picks: &'a [AnnotatedPick]) -> Vec<&'a AnnotatedPick> {
        picks.iter().filter(|p| self.matches(p)).collect()
    }

    /// Clear every filter and restore the default bounds.
    pub fn reset(&mut self) {
        self.teams.clear();
        self.positions.clear();
        self.tiers.clear();
        self.price.reset();
        self.expected_price.reset();
        self.inflation.reset();
        self.player_text.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.teams.is_empty()
            || !self.positions.is_empty()
            || !self.tiers.is_empty()
            || self.price.is_active()
            || self.expected_price.is_active()
            || self.inflation.is_active()
            || !self.player_text.trim().is_empty()
    }

    pub fn toggle_team(&mut self, team: &str) {
        toggle(&mut self.teams, team.to_string());
    }

    pub fn toggle_position(&mut self, position: Position) {
        toggle(&mut self.positions, position);
    }

    pub fn toggle_tier(&mut self, tier: Tier) {
        toggle(&mut self.tiers, tier);
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::Pick;

    fn annotated(
        name: &str,
        team: &str,
        pos: Position,
        price: u32,
        expected: Option<f64>,
        tier: Tier,
    ) -> AnnotatedPick {
        let inflation = expected
            .filter(|e| *e > 0.0)
            .map(|e| (f64::from(price) - e) / e * 100.0);
        AnnotatedPick {
            pick: Pick {
                pick_no: 1,
                draft_slot: 1,
                player_name: name.to_string(),
                position: pos,
                price,
            },
            team_name: team.to_string(),
            expected_price: expected,
            doe: expected.map(|e| f64::from(price) - e),
            inflation,
            tier,
        }
    }

    fn sample() -> Vec<AnnotatedPick> {
        vec![
            annotated("Josh Allen", "Alpha", Position::QB, 30, Some(25.0), Tier::Ranked(1)),
            annotated("Bijan Robinson", "Beta", Position::RB, 60, Some(55.0), Tier::Ranked(1)),
            annotated("Puka Nacua", "Alpha", Position::WR, 40, Some(45.0), Tier::Ranked(2)),
            annotated("Mystery Man", "Gamma", Position::TE, 2, None, Tier::NotAvailable),
        ]
    }

    fn names(picks: &[&AnnotatedPick]) -> Vec<String> {
        picks.iter().map(|p| p.pick.player_name.clone()).collect()
    }

    #[test]
    fn default_filter_passes_everything() {
        let picks = sample();
        let filter = FilterState::default();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&picks).len(), 4);
    }

    #[test]
    fn sets_or_within_and_across_fields() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.toggle_position(Position::QB);
        filter.toggle_position(Position::WR);
        assert_eq!(names(&filter.apply(&picks)), vec!["Josh Allen", "Puka Nacua"]);

        filter.toggle_tier(Tier::Ranked(2));
        assert_eq!(names(&filter.apply(&picks)), vec!["Puka Nacua"]);

        filter.toggle_team("Beta");
        assert!(filter.apply(&picks).is_empty());
    }

    #[test]
    fn toggle_twice_removes() {
        let mut filter = FilterState::default();
        filter.toggle_team("Alpha");
        filter.toggle_team("Alpha");
        assert!(filter.teams.is_empty());
    }

    #[test]
    fn ranges_are_inclusive() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.price.set(30.0, 40.0);
        assert_eq!(names(&filter.apply(&picks)), vec!["Josh Allen", "Puka Nacua"]);
    }

    #[test]
    fn active_range_rejects_missing_values() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.expected_price.set(0.0, 50.0);
        let result = names(&filter.apply(&picks));
        assert_eq!(result, vec!["Josh Allen", "Puka Nacua"]);
        assert!(!result.contains(&"Mystery Man".to_string()));
    }

    #[test]
    fn inflation_range_filters_by_percentage() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.inflation.set(0.0, 100.0);
        assert_eq!(
            names(&filter.apply(&picks)),
            vec!["Josh Allen", "Bijan Robinson"]
        );
    }

    #[test]
    fn set_swaps_inverted_bounds() {
        let mut range = NumericRange::new(RangeBounds { min: 0.0, max: 100.0 });
        range.set(50.0, 10.0);
        assert_eq!((range.min, range.max), (10.0, 50.0));
        range.shift_min(100.0);
        assert_eq!(range.min, 50.0);
        range.shift_max(-100.0);
        assert_eq!(range.max, 50.0);
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.player_text = "ROBIN".into();
        assert_eq!(names(&filter.apply(&picks)), vec!["Bijan Robinson"]);
    }

    #[test]
    fn filters_are_idempotent() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.toggle_team("Alpha");
        let once: Vec<AnnotatedPick> = filter.apply(&picks).into_iter().cloned().collect();
        let twice = filter.apply(&once);
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn reset_restores_full_list() {
        let picks = sample();
        let mut filter = FilterState::default();
        filter.toggle_team("Gamma");
        filter.price.set(1.0, 5.0);
        filter.player_text = "x".into();
        assert!(filter.is_active());

        filter.reset();
        assert!(!filter.is_active());
        assert_eq!(filter, FilterState::default());
        assert_eq!(filter.apply(&picks).len(), 4);
    }
}
