// Team rosters, budgets and positional needs.
//
// A breakdown is built either from the backend's team feed or, when that
// feed is unavailable, locally from the pick list. Both paths produce the
// same shape: a fixed starter template, a fixed-length bench, and a
// strength/need verdict per position against the league average.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::draft::pick::{team_name_for_slot, Pick, Position};
use crate::remote::payload::{RawRosterPlayer, TeamBreakdownPayload};

/// Starter slot labels, in display order.
pub const STARTER_TEMPLATE: [&str; 10] =
    ["QB", "RB", "RB", "WR", "WR", "WR", "TE", "FLEX", "DEF", "K"];

/// Dollars represented by one budget-gauge segment.
const GAUGE_STEP: f64 = 40.0;
const GAUGE_SEGMENTS: usize = 5;

const STRENGTH_RATIO: f64 = 1.2;
const NEED_RATIO: f64 = 0.8;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterPlayer {
    pub name: String,
    pub position: Position,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSlot {
    pub label: String,
    pub player: Option<RosterPlayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NeedLevel {
    Strength,
    Need,
    Neutral,
}

impl NeedLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NeedLevel::Strength => "Strength",
            NeedLevel::Need => "Need",
            NeedLevel::Neutral => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBreakdown {
    pub slot: u32,
    pub team_name: String,
    pub total_spend: f64,
    pub remaining_budget: f64,
    pub starters: Vec<RosterSlot>,
    pub bench: Vec<Option<RosterPlayer>>,
    pub needs: BTreeMap<Position, NeedLevel>,
}

/// League shape needed to lay out rosters.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueShape {
    pub num_teams: u32,
    pub team_budget: u32,
    pub bench_spots: usize,
    pub draft_order: Vec<String>,
}

// ---------------------------------------------------------------------------
// Roster layout
// ---------------------------------------------------------------------------

/// Place players into the starter template, then the bench.
///
/// Players are assigned in the order given. The FLEX slot takes the first
/// leftover RB/WR/TE; everything else goes to the bench, padded or truncated
/// to `bench_spots`.
fn lay_out_roster(
    players: Vec<RosterPlayer>,
    bench_spots: usize,
) -> (Vec<RosterSlot>, Vec<Option<RosterPlayer>>) {
    let mut starters: Vec<RosterSlot> = STARTER_TEMPLATE
        .iter()
        .map(|label| RosterSlot {
            label: (*label).to_string(),
            player: None,
        })
        .collect();

    let mut leftovers = Vec::new();
    for player in players {
        let label = player.position.display_str().to_string();
        match starters
            .iter_mut()
            .find(|slot| slot.player.is_none() && slot.label == label)
        {
            Some(slot) => slot.player = Some(player),
            None => leftovers.push(player),
        }
    }

    if let Some(idx) = leftovers.iter().position(|p| p.position.is_flex_eligible()) {
        let flex_player = leftovers.remove(idx);
        if let Some(flex) = starters
            .iter_mut()
            .find(|slot| slot.label == "FLEX" && slot.player.is_none())
        {
            flex.player = Some(flex_player);
        }
    }

    let mut bench: Vec<Option<RosterPlayer>> = leftovers.into_iter().map(Some).collect();
    bench.resize(bench_spots, None);
    (starters, bench)
}

fn starter_spend_by_position(starters: &[RosterSlot]) -> BTreeMap<Position, f64> {
    let mut spend: BTreeMap<Position, f64> =
        Position::STANDARD.iter().map(|p| (p.clone(), 0.0)).collect();
    for player in starters.iter().filter_map(|s| s.player.as_ref()) {
        if let Some(total) = spend.get_mut(&player.position) {
            *total += player.amount;
        }
    }
    spend
}

/// Mark each team's positions as strengths or needs relative to the league
/// average starter spend at that position.
fn assign_needs(teams: &mut [TeamBreakdown]) {
    if teams.is_empty() {
        return;
    }
    let spends: Vec<BTreeMap<Position, f64>> = teams
        .iter()
        .map(|t| starter_spend_by_position(&t.starters))
        .collect();

    let n = teams.len() as f64;
    for pos in Position::STANDARD {
        let avg = spends.iter().map(|s| s[&pos]).sum::<f64>() / n;
        for (team, spend) in teams.iter_mut().zip(&spends) {
            let value = spend[&pos];
            let level = if avg > 0.0 && value > STRENGTH_RATIO * avg {
                NeedLevel::Strength
            } else if value < NEED_RATIO * avg {
                NeedLevel::Need
            } else {
                NeedLevel::Neutral
            };
            team.needs.insert(pos.clone(), level);
        }
    }
}

fn roster_player_from_raw(raw: &RawRosterPlayer) -> RosterPlayer {
    RosterPlayer {
        name: raw.name.clone(),
        position: Position::from_str_pos(&raw.position),
        amount: raw.amount.or_zero(),
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build breakdowns from the backend's team feed.
///
/// Slots missing from the payload get zero spend and the full budget.
pub fn build_from_payload(payload: &TeamBreakdownPayload, league: &LeagueShape) -> Vec<TeamBreakdown> {
    let budget = f64::from(league.team_budget);
    let mut teams: Vec<TeamBreakdown> = (1..=league.num_teams)
        .map(|slot| {
            let raw = payload.get(&slot.to_string());
            let players: Vec<RosterPlayer> = raw
                .map(|t| {
                    t.starters
                        .iter()
                        .chain(t.bench.iter())
                        .filter(|p| !p.name.trim().is_empty())
                        .map(roster_player_from_raw)
                        .collect()
                })
                .unwrap_or_default();
            let total_spend = raw
                .and_then(|t| t.total_spend)
                .and_then(|n| n.value())
                .unwrap_or_else(|| players.iter().map(|p| p.amount).sum());
            let remaining_budget = raw
                .and_then(|t| t.remaining_budget)
                .and_then(|n| n.value())
                .unwrap_or(budget - total_spend);
            let (starters, bench) = lay_out_roster(players, league.bench_spots);
            TeamBreakdown {
                slot,
                team_name: team_name_for_slot(slot, &league.draft_order),
                total_spend,
                remaining_budget,
                starters,
                bench,
                needs: BTreeMap::new(),
            }
        })
        .collect();
    assign_needs(&mut teams);
    teams
}

/// Build breakdowns locally from the pick list. Picks from slots beyond the
/// league size are ignored.
pub fn build_from_picks(picks: &[Pick], league: &LeagueShape) -> Vec<TeamBreakdown> {
    let budget = f64::from(league.team_budget);
    let mut ordered: Vec<&Pick> = picks.iter().collect();
    ordered.sort_by_key(|p| p.pick_no);

    let mut teams: Vec<TeamBreakdown> = (1..=league.num_teams)
        .map(|slot| {
            let players: Vec<RosterPlayer> = ordered
                .iter()
                .filter(|p| p.draft_slot == slot)
                .map(|p| RosterPlayer {
                    name: p.player_name.clone(),
                    position: p.position.clone(),
                    amount: p.price_f64(),
                })
                .collect();
            let total_spend: f64 = players.iter().map(|p| p.amount).sum();
            let (starters, bench) = lay_out_roster(players, league.bench_spots);
            TeamBreakdown {
                slot,
                team_name: team_name_for_slot(slot, &league.draft_order),
                total_spend,
                remaining_budget: budget - total_spend,
                starters,
                bench,
                needs: BTreeMap::new(),
            }
        })
        .collect();
    assign_needs(&mut teams);
    teams
}

/// Budget gauge as `(filled, empty)` segments: one segment per $40 left,
/// rounded up, capped at five.
pub fn budget_gauge(remaining: f64) -> (usize, usize) {
    let filled = if remaining <= 0.0 || !remaining.is_finite() {
        0
    } else {
        ((remaining / GAUGE_STEP).ceil() as usize).min(GAUGE_SEGMENTS)
    };
    (filled, GAUGE_SEGMENTS - filled)
}
