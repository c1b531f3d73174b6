// Price-versus-pick-number regression.
//
// For each skill position a least-squares line is fitted to (pick number,
// price). The R² of that fit drives a "cost of waiting" estimate: how much
// value slips away by waiting 1, 5, 10 or 20 picks to buy at that position.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::draft::pick::{Pick, Position};
use crate::remote::payload::{RawPositionRegression, ScatterPayload};
use crate::valuation::inflation::AnnotatedPick;
use crate::valuation::table::Tier;

/// Least-squares fit `price = slope * pick_no + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
    pub samples: usize,
}

/// Fit a line through `(x, y)` points.
///
/// Returns `None` when fewer than two distinct `x` values are present, since
/// the slope is undefined. When every `y` is identical the fit is perfect but
/// explains no variance, so `r2` is reported as zero.
pub fn fit(points: &[(f64, f64)]) -> Option<RegressionFit> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / nf;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / nf;

    let ss_xx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if ss_xx == 0.0 {
        return None;
    }
    let ss_xy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let r2 = if ss_tot == 0.0 {
        0.0
    } else {
        let ss_res: f64 = points
            .iter()
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();
        1.0 - ss_res / ss_tot
    };

    Some(RegressionFit {
        slope,
        intercept,
        r2,
        samples: n,
    })
}

// ---------------------------------------------------------------------------
// Cost of waiting
// ---------------------------------------------------------------------------

/// Estimated value lost by waiting N picks, scaled from R².
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostOfWaiting {
    pub one_pick: f64,
    pub five_picks: f64,
    pub ten_picks: f64,
    pub twenty_picks: f64,
}

impl CostOfWaiting {
    pub fn from_r2(r2: f64) -> Self {
        CostOfWaiting {
            one_pick: r2 * 0.005,
            five_picks: r2 * 0.025,
            ten_picks: r2 * 0.05,
            twenty_picks: r2 * 0.10,
        }
    }
}

/// Regression summary shown per position. Both fields are `None` ("N/A")
/// when the fit is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PositionRegression {
    pub r2: Option<f64>,
    pub cost_of_waiting: Option<CostOfWaiting>,
}

impl PositionRegression {
    fn from_fit(fit: Option<RegressionFit>) -> Self {
        match fit {
            Some(f) => PositionRegression {
                r2: Some(f.r2),
                cost_of_waiting: Some(CostOfWaiting::from_r2(f.r2)),
            },
            None => PositionRegression::default(),
        }
    }

    fn from_payload(raw: &RawPositionRegression) -> Self {
        let r2 = raw.r2.value();
        let waits = &raw.cost_of_waiting;
        let get = |key: &str| waits.get(key).and_then(|v| v.value());
        let cost_of_waiting = match (
            get("1_pick"),
            get("5_picks"),
            get("10_picks"),
            get("20_picks"),
        ) {
            (Some(one), Some(five), Some(ten), Some(twenty)) => Some(CostOfWaiting {
                one_pick: one,
                five_picks: five,
                ten_picks: ten,
                twenty_picks: twenty,
            }),
            _ => r2.map(CostOfWaiting::from_r2),
        };
        PositionRegression { r2, cost_of_waiting }
    }
}

/// Compute a regression for every skill position from the pick list.
pub fn regressions_by_position(picks: &[Pick]) -> BTreeMap<Position, PositionRegression> {
    Position::SKILL
        .iter()
        .map(|pos| {
            let points: Vec<(f64, f64)> = picks
                .iter()
                .filter(|p| &p.position == pos)
                .map(|p| (f64::from(p.pick_no), p.price_f64()))
                .collect();
            (pos.clone(), PositionRegression::from_fit(fit(&points)))
        })
        .collect()
}

/// Merge server-provided regression values over locally computed ones.
///
/// The server's numbers win for any position it reports; local fits fill
/// the rest.
pub fn merge_server_regressions(
    local: &mut BTreeMap<Position, PositionRegression>,
    server: &ScatterPayload,
) {
    for (label, raw) in &server.r2_values {
        let position = Position::from_str_pos(label);
        local.insert(position, PositionRegression::from_payload(raw));
    }
}

// ---------------------------------------------------------------------------
// Scatter points
// ---------------------------------------------------------------------------

/// One point in the price-vs-pick scatter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub pick_no: u32,
    pub price: f64,
    pub position: Position,
    pub player_name: String,
    pub expected_price: Option<f64>,
    pub tier: Tier,
}

/// Build scatter points from annotated picks, in pick order.
pub fn scatter_points(picks: &[AnnotatedPick]) -> Vec<ScatterPoint> {
    let mut points: Vec<ScatterPoint> = picks
        .iter()
        .map(|a| ScatterPoint {
            pick_no: a.pick.pick_no,
            price: a.pick.price_f64(),
            position: a.pick.position.clone(),
            player_name: a.pick.player_name.clone(),
            expected_price: a.expected_price,
            tier: a.tier,
        })
        .collect();
    points.sort_by_key(|p| p.pick_no);
    points
}
