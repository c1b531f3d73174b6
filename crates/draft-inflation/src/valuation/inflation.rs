// Draft inflation aggregation.
//
// Turns the current pick list plus a valuation lookup into overall,
// positional and tiered inflation statistics. Recomputed from scratch on
// every poll; no state carries over between passes.
//
// Two formulas are in play and both are kept as-is:
// - overall inflation is a ratio of sums: 100 * sum(price - expected) / sum(expected)
// - positional and tiered inflation are averages of per-pick percentages
// They diverge whenever picks at different price levels carry different
// markups.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::draft::pick::{team_name_for_slot, Pick, Position};
use crate::remote::payload::{InflationPayload, LooseNumber, NestedNumbers};
use crate::valuation::table::{Tier, ValuationTable};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-position statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PositionStat {
    /// Average per-pick inflation percentage over priced picks.
    pub inflation: f64,
    /// Sum of degree-of-excess (price - expected) over priced picks.
    pub doe: f64,
    /// Every pick at this position, priced or not.
    pub picks: usize,
    /// Picks that had a positive expected price.
    pub priced_picks: usize,
    /// Total dollars spent at this position.
    pub total_spent: f64,
}

/// Per-(position, tier) statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierStat {
    pub actual_cost: f64,
    pub expected_cost: f64,
    pub doe: f64,
    pub picks: usize,
    /// Average per-pick inflation percentage over priced picks in the tier.
    pub inflation: f64,
    /// `actual_cost / picks`.
    pub avg_cost: f64,
}

/// One pick annotated with its valuation, as the ticker and filters see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedPick {
    pub pick: Pick,
    pub team_name: String,
    /// Expected price; `None` when the player has no valuation entry.
    pub expected_price: Option<f64>,
    /// Degree-of-excess; `None` unless the expected price is positive.
    pub doe: Option<f64>,
    /// Inflation percentage; `None` unless the expected price is positive.
    pub inflation: Option<f64>,
    pub tier: Tier,
}

/// Full aggregation output for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InflationReport {
    /// Ratio-of-sums inflation percentage.
    pub overall_inflation: f64,
    /// Dollars spent across every pick.
    pub total_actual_cost: f64,
    /// Expected dollars across priced picks; unmatched picks add nothing.
    pub total_expected_cost: f64,
    pub total_picks: usize,
    pub positions: BTreeMap<Position, PositionStat>,
    pub tiers: BTreeMap<Position, BTreeMap<Tier, TierStat>>,
    /// Player names with no valuation entry, in pick order.
    pub unmatched: Vec<String>,
}

impl InflationReport {
    /// Average-of-ratios inflation for one position, zero when absent.
    pub fn position_inflation(&self, position: &Position) -> f64 {
        self.positions
            .get(position)
            .map(|stat| stat.inflation)
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PercentAverage {
    sum: f64,
    count: usize,
}

impl PercentAverage {
    fn push(&mut self, pct: f64) {
        self.sum += pct;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Per-pick annotation
// ---------------------------------------------------------------------------

/// Annotate every pick with its expected price, DOE, inflation and tier.
///
/// DOE and inflation are only defined when the expected price is positive;
/// a matched entry with a zero price keeps its tier but nothing else.
pub fn annotate_picks(
    picks: &[Pick],
    valuations: &ValuationTable,
    draft_order: &[String],
) -> Vec<AnnotatedPick> {
    picks
        .iter()
        .map(|pick| {
            let entry = valuations.lookup(&pick.player_name);
            let expected_price = entry.map(|e| e.expected_price);
            let (doe, inflation) = match expected_price {
                Some(expected) if expected > 0.0 => {
                    let doe = pick.price_f64() - expected;
                    (Some(doe), Some(doe / expected * 100.0))
                }
                _ => (None, None),
            };
            AnnotatedPick {
                pick: pick.clone(),
                team_name: team_name_for_slot(pick.draft_slot, draft_order),
                expected_price,
                doe,
                inflation,
                tier: entry.map(|e| e.tier).unwrap_or(Tier::NotAvailable),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate annotated picks into an [`InflationReport`].
///
/// Every standard position is present in the output even with no picks, so
/// an empty draft yields zeroed statistics rather than missing keys.
pub fn aggregate(picks: &[AnnotatedPick]) -> InflationReport {
    let mut report = InflationReport::default();
    for pos in Position::STANDARD {
        report.positions.insert(pos, PositionStat::default());
    }

    let mut doe_total = 0.0;
    let mut position_pct: BTreeMap<Position, PercentAverage> = BTreeMap::new();
    let mut tier_pct: BTreeMap<(Position, Tier), PercentAverage> = BTreeMap::new();

    for annotated in picks {
        let pick = &annotated.pick;
        let price = pick.price_f64();
        let position = pick.position.clone();

        report.total_picks += 1;
        report.total_actual_cost += price;

        let pos_stat = report.positions.entry(position.clone()).or_default();
        pos_stat.picks += 1;
        pos_stat.total_spent += price;

        let tier_stat = report
            .tiers
            .entry(position.clone())
            .or_default()
            .entry(annotated.tier)
            .or_default();
        tier_stat.picks += 1;
        tier_stat.actual_cost += price;

        let (Some(expected), Some(doe), Some(pct)) =
            (annotated.expected_price, annotated.doe, annotated.inflation)
        else {
            if annotated.expected_price.is_none() {
                report.unmatched.push(pick.player_name.clone());
            }
            continue;
        };

        report.total_expected_cost += expected;
        doe_total += doe;

        pos_stat.doe += doe;
        pos_stat.priced_picks += 1;
        position_pct.entry(position.clone()).or_default().push(pct);

        tier_stat.expected_cost += expected;
        tier_stat.doe += doe;
        tier_pct.entry((position, annotated.tier)).or_default().push(pct);
    }

    report.overall_inflation = if report.total_expected_cost > 0.0 {
        doe_total / report.total_expected_cost * 100.0
    } else {
        0.0
    };

    for (position, stat) in report.positions.iter_mut() {
        stat.inflation = position_pct
            .get(position)
            .map(PercentAverage::mean)
            .unwrap_or(0.0);
    }

    for (position, tiers) in report.tiers.iter_mut() {
        for (tier, stat) in tiers.iter_mut() {
            stat.inflation = tier_pct
                .get(&(position.clone(), *tier))
                .map(PercentAverage::mean)
                .unwrap_or(0.0);
            stat.avg_cost = if stat.picks == 0 {
                0.0
            } else {
                stat.actual_cost / stat.picks as f64
            };
        }
    }

    report
}

/// Convenience: annotate then aggregate.
pub fn compute(
    picks: &[Pick],
    valuations: &ValuationTable,
    draft_order: &[String],
) -> (Vec<AnnotatedPick>, InflationReport) {
    let annotated = annotate_picks(picks, valuations, draft_order);
    let report = aggregate(&annotated);
    (annotated, report)
}

// ---------------------------------------------------------------------------
// Backend figures
// ---------------------------------------------------------------------------

/// Backend-computed inflation for one position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerPositionStat {
    /// Percent, converted from the backend's fraction.
    pub inflation: Option<f64>,
    pub picks: usize,
}

/// Backend-computed inflation for one (position, tier).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerTierStat {
    pub inflation: Option<f64>,
    pub picks: usize,
    pub doe: Option<f64>,
    pub avg_cost: Option<f64>,
}

/// The `/inflation` payload in the same units and keys as `InflationReport`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerInflation {
    pub overall: Option<f64>,
    pub positions: BTreeMap<Position, ServerPositionStat>,
    pub tiers: BTreeMap<Position, BTreeMap<Tier, ServerTierStat>>,
}

impl ServerInflation {
    pub fn from_payload(payload: &InflationPayload) -> Self {
        let mut server = ServerInflation {
            overall: payload.overall_percent(),
            ..Default::default()
        };

        for (pos, value) in &payload.positional_inflation {
            server
                .positions
                .entry(Position::from_str_pos(pos))
                .or_default()
                .inflation = value.value().map(|f| f * 100.0);
        }
        for (pos, value) in &payload.total_picks {
            server
                .positions
                .entry(Position::from_str_pos(pos))
                .or_default()
                .picks = count(value);
        }

        let tiers = &mut server.tiers;
        merge_tier_field(tiers, &payload.tiered_inflation, |stat, v| {
            stat.inflation = v.value().map(|f| f * 100.0)
        });
        merge_tier_field(tiers, &payload.picks_per_tier, |stat, v| stat.picks = count(v));
        merge_tier_field(tiers, &payload.doe_values, |stat, v| stat.doe = v.value());
        merge_tier_field(tiers, &payload.avg_tier_costs, |stat, v| stat.avg_cost = v.value());

        server
    }

    pub fn position_inflation(&self, position: &Position) -> Option<f64> {
        self.positions.get(position).and_then(|s| s.inflation)
    }

    pub fn tier_inflation(&self, position: &Position, tier: &Tier) -> Option<f64> {
        self.tiers
            .get(position)
            .and_then(|tiers| tiers.get(tier))
            .and_then(|s| s.inflation)
    }
}

fn merge_tier_field(
    tiers: &mut BTreeMap<Position, BTreeMap<Tier, ServerTierStat>>,
    nested: &NestedNumbers,
    set: fn(&mut ServerTierStat, &LooseNumber),
) {
    for (pos, by_tier) in nested {
        let stats = tiers.entry(Position::from_str_pos(pos)).or_default();
        for (tier, value) in by_tier {
            set(stats.entry(Tier::parse(tier)).or_default(), value);
        }
    }
}

fn count(value: &LooseNumber) -> usize {
    value.value().filter(|n| *n > 0.0).map(|n| n as usize).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Color bands
// ---------------------------------------------------------------------------

/// Seven-step severity band used to color inflation and DOE cells.
///
/// Positive means paying more than expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    SevereNegative,
    ModerateNegative,
    MildNegative,
    Neutral,
    MildPositive,
    ModeratePositive,
    SeverePositive,
}

/// Band an inflation percentage at 5/10/15 points either side of zero.
pub fn inflation_severity(pct: f64) -> Severity {
    if !pct.is_finite() {
        return Severity::Neutral;
    }
    if pct < -15.0 {
        Severity::SevereNegative
    } else if pct < -10.0 {
        Severity::ModerateNegative
    } else if pct < -5.0 {
        Severity::MildNegative
    } else if pct < 5.0 {
        Severity::Neutral
    } else if pct < 10.0 {
        Severity::MildPositive
    } else if pct < 15.0 {
        Severity::ModeratePositive
    } else {
        Severity::SeverePositive
    }
}

/// Band a dollar DOE at 1/5/10 dollars either side of zero. A missing DOE
/// is neutral.
pub fn doe_severity(doe: Option<f64>) -> Severity {
    let Some(doe) = doe.filter(|d| d.is_finite()) else {
        return Severity::Neutral;
    };
    if doe >= 10.0 {
        Severity::SeverePositive
    } else if doe >= 5.0 {
        Severity::ModeratePositive
    } else if doe >= 1.0 {
        Severity::MildPositive
    } else if doe > -1.0 {
        Severity::Neutral
    } else if doe >= -5.0 {
        Severity::MildNegative
    } else if doe >= -10.0 {
        Severity::ModerateNegative
    } else {
        Severity::SevereNegative
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::table::ValuationEntry;

    fn pick(pick_no: u32, name: &str, pos: Position, price: u32) -> Pick {
        Pick {
            pick_no,
            draft_slot: (pick_no - 1) % 12 + 1,
            player_name: name.to_string(),
            position: pos,
            price,
        }
    }

    fn table(entries: &[(&str, f64, Tier)]) -> ValuationTable {
        let mut t = ValuationTable::new();
        for (name, price, tier) in entries {
            t.insert(ValuationEntry {
                player_name: name.to_string(),
                expected_price: *price,
                tier: *tier,
            });
        }
        t
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_pick_list_yields_zeroed_standard_positions() {
        let (annotated, report) = compute(&[], &ValuationTable::new(), &[]);
        assert!(annotated.is_empty());
        assert_eq!(report.overall_inflation, 0.0);
        assert_eq!(report.total_picks, 0);
        assert_eq!(report.total_expected_cost, 0.0);
        assert_eq!(report.positions.len(), 6);
        for pos in Position::STANDARD {
            let stat = &report.positions[&pos];
            assert_eq!(stat.picks, 0, "{pos}");
            assert_eq!(stat.inflation, 0.0, "{pos}");
        }
        assert!(report.tiers.is_empty());
    }

    #[test]
    fn single_matched_running_back() {
        let picks = vec![pick(1, "A", Position::RB, 20)];
        let vals = table(&[("A", 10.0, Tier::Ranked(1))]);
        let (_, report) = compute(&picks, &vals, &[]);

        assert!(approx(report.overall_inflation, 100.0));
        assert!(approx(report.position_inflation(&Position::RB), 100.0));
        let tier = &report.tiers[&Position::RB][&Tier::Ranked(1)];
        assert!(approx(tier.doe, 10.0));
        assert_eq!(tier.picks, 1);
        assert!(approx(tier.avg_cost, 20.0));
        assert!(approx(tier.inflation, 100.0));
    }

    #[test]
    fn single_unmatched_quarterback() {
        let picks = vec![pick(1, "B", Position::QB, 15)];
        let (annotated, report) = compute(&picks, &ValuationTable::new(), &[]);

        assert_eq!(report.overall_inflation, 0.0);
        assert_eq!(report.total_expected_cost, 0.0);
        assert_eq!(annotated[0].tier, Tier::NotAvailable);
        assert!(annotated[0].doe.is_none());
        assert!(annotated[0].inflation.is_none());

        let tier = &report.tiers[&Position::QB][&Tier::NotAvailable];
        assert_eq!(tier.picks, 1);
        assert_eq!(tier.doe, 0.0);
        assert!(approx(tier.actual_cost, 15.0));
        assert_eq!(report.positions[&Position::QB].picks, 1);
        assert_eq!(report.positions[&Position::QB].inflation, 0.0);
        assert_eq!(report.unmatched, vec!["B".to_string()]);
    }

    #[test]
    fn unmatched_pick_is_excluded_from_ratios() {
        let picks = vec![
            pick(1, "A", Position::RB, 20),
            pick(2, "Nobody", Position::RB, 50),
        ];
        let vals = table(&[("A", 10.0, Tier::Ranked(1))]);
        let (_, report) = compute(&picks, &vals, &[]);

        assert!(approx(report.total_expected_cost, 10.0));
        assert!(approx(report.total_actual_cost, 70.0));
        assert!(approx(report.overall_inflation, 100.0));
        assert!(approx(report.position_inflation(&Position::RB), 100.0));
        assert_eq!(report.positions[&Position::RB].picks, 2);
        assert_eq!(report.positions[&Position::RB].priced_picks, 1);
    }

    #[test]
    fn positional_pick_counts_sum_to_total() {
        let picks = vec![
            pick(1, "A", Position::RB, 20),
            pick(2, "B", Position::QB, 15),
            pick(3, "C", Position::WR, 30),
            pick(4, "D", Position::Other("LB".into()), 1),
            pick(5, "E", Position::DEF, 2),
        ];
        let vals = table(&[("A", 10.0, Tier::Ranked(1)), ("C", 25.0, Tier::Ranked(2))]);
        let (_, report) = compute(&picks, &vals, &[]);

        let sum: usize = report.positions.values().map(|s| s.picks).sum();
        assert_eq!(sum, report.total_picks);
        assert_eq!(sum, 5);
        assert!(report.positions.contains_key(&Position::Other("LB".into())));
    }

    #[test]
    fn overall_is_ratio_of_sums_positional_is_average_of_ratios() {
        // A: 20 vs 10 -> +100%; B: 30 vs 30 -> 0%
        let picks = vec![
            pick(1, "A", Position::WR, 20),
            pick(2, "B", Position::WR, 30),
        ];
        let vals = table(&[("A", 10.0, Tier::Ranked(1)), ("B", 30.0, Tier::Ranked(1))]);
        let (_, report) = compute(&picks, &vals, &[]);

        // (10 + 0) / 40 = 25%
        assert!(approx(report.overall_inflation, 25.0));
        // (100 + 0) / 2 = 50%
        assert!(approx(report.position_inflation(&Position::WR), 50.0));
        let tier = &report.tiers[&Position::WR][&Tier::Ranked(1)];
        assert!(approx(tier.inflation, 50.0));
        assert!(approx(tier.doe, 10.0));
        assert!(approx(tier.expected_cost, 40.0));
        assert!(approx(tier.avg_cost, 25.0));
    }

    #[test]
    fn zero_expected_price_keeps_tier_but_no_ratio() {
        let picks = vec![pick(1, "Cheap", Position::K, 1)];
        let vals = table(&[("Cheap", 0.0, Tier::Ranked(3))]);
        let (annotated, report) = compute(&picks, &vals, &[]);

        assert_eq!(annotated[0].tier, Tier::Ranked(3));
        assert_eq!(annotated[0].expected_price, Some(0.0));
        assert!(annotated[0].doe.is_none());
        assert_eq!(report.overall_inflation, 0.0);
        assert!(report.unmatched.is_empty());
        assert_eq!(report.tiers[&Position::K][&Tier::Ranked(3)].picks, 1);
    }

    #[test]
    fn annotate_resolves_team_names() {
        let picks = vec![pick(1, "A", Position::RB, 20), pick(2, "B", Position::RB, 5)];
        let order = vec!["Sharks".to_string()];
        let annotated = annotate_picks(&picks, &ValuationTable::new(), &order);
        assert_eq!(annotated[0].team_name, "Sharks");
        assert_eq!(annotated[1].team_name, "Team 2");
    }

    #[test]
    fn server_figures_convert_to_percent_and_typed_keys() {
        let payload: InflationPayload = serde_json::from_str(
            r#"{
                "overall_inflation": "0.1",
                "positional_inflation": {"RB": 0.25, "DST": "N/A"},
                "total_picks": {"RB": 3},
                "tiered_inflation": {"RB": {"1": "-0.05", "2": 0}},
                "picks_per_tier": {"RB": {"1": 2}},
                "avg_tier_costs": {"RB": {"1": 47.5}},
                "doe_values": {"RB": {"1": -2.5}}
            }"#,
        )
        .unwrap();
        let server = ServerInflation::from_payload(&payload);

        assert!((server.overall.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(server.position_inflation(&Position::RB), Some(25.0));
        assert_eq!(server.positions[&Position::RB].picks, 3);
        assert_eq!(server.position_inflation(&Position::DEF), None);

        let tier1 = &server.tiers[&Position::RB][&Tier::Ranked(1)];
        assert!((tier1.inflation.unwrap() + 5.0).abs() < 1e-9);
        assert_eq!(tier1.picks, 2);
        assert_eq!(tier1.doe, Some(-2.5));
        assert_eq!(tier1.avg_cost, Some(47.5));
        assert_eq!(server.tier_inflation(&Position::RB, &Tier::Ranked(2)), Some(0.0));
        assert_eq!(server.tier_inflation(&Position::WR, &Tier::Ranked(1)), None);
    }

    #[test]
    fn server_figures_from_empty_payload() {
        let server = ServerInflation::from_payload(&InflationPayload::default());
        assert_eq!(server, ServerInflation::default());
    }

    #[test]
    fn inflation_severity_bands() {
        assert_eq!(inflation_severity(-20.0), Severity::SevereNegative);
        assert_eq!(inflation_severity(-12.0), Severity::ModerateNegative);
        assert_eq!(inflation_severity(-6.0), Severity::MildNegative);
        assert_eq!(inflation_severity(0.0), Severity::Neutral);
        assert_eq!(inflation_severity(4.99), Severity::Neutral);
        assert_eq!(inflation_severity(5.0), Severity::MildPositive);
        assert_eq!(inflation_severity(10.0), Severity::ModeratePositive);
        assert_eq!(inflation_severity(15.0), Severity::SeverePositive);
        assert_eq!(inflation_severity(f64::NAN), Severity::Neutral);
    }

    #[test]
    fn doe_severity_bands() {
        assert_eq!(doe_severity(None), Severity::Neutral);
        assert_eq!(doe_severity(Some(12.0)), Severity::SeverePositive);
        assert_eq!(doe_severity(Some(5.0)), Severity::ModeratePositive);
        assert_eq!(doe_severity(Some(1.0)), Severity::MildPositive);
        assert_eq!(doe_severity(Some(0.995)), Severity::Neutral);
        assert_eq!(doe_severity(Some(-1.0)), Severity::MildNegative);
        assert_eq!(doe_severity(Some(-7.0)), Severity::ModerateNegative);
        assert_eq!(doe_severity(Some(-11.0)), Severity::SevereNegative);
    }
}
