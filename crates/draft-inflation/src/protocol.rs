// Message types passed between the poller, the app orchestrator and the TUI.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::draft::pick::Position;
use crate::draft::team::TeamBreakdown;
use crate::fetch::Snapshot;
use crate::valuation::inflation::{AnnotatedPick, InflationReport, ServerInflation};
use crate::valuation::regression::{PositionRegression, ScatterPoint};

// ---------------------------------------------------------------------------
// Poller -> App
// ---------------------------------------------------------------------------

/// Result of one poll tick, tagged with the subscription generation that
/// produced it.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Started {
        generation: u64,
    },
    Fetched {
        generation: u64,
        snapshot: Box<Snapshot>,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

impl PollEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PollEvent::Started { generation }
            | PollEvent::Fetched { generation, .. }
            | PollEvent::Failed { generation, .. } => *generation,
        }
    }
}

// ---------------------------------------------------------------------------
// TUI -> App
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Quit,
    ToggleLive,
    SetDraftId(String),
    Refresh,
}

// ---------------------------------------------------------------------------
// App -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Inflation,
    Ticker,
    Teams,
    Scatter,
}

impl TabId {
    pub const ALL: [TabId; 4] = [TabId::Inflation, TabId::Ticker, TabId::Teams, TabId::Scatter];

    pub fn label(&self) -> &'static str {
        match self {
            TabId::Inflation => "Inflation",
            TabId::Ticker => "Ticker",
            TabId::Teams => "Teams",
            TabId::Scatter => "Scatter",
        }
    }
}

/// Everything the dashboard renders for one snapshot, derived by the app.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub draft_id: String,
    pub fetched_at: DateTime<Utc>,
    pub from_cache: bool,
    pub report: InflationReport,
    /// Annotated picks, newest first.
    pub picks: Vec<AnnotatedPick>,
    pub teams: Vec<TeamBreakdown>,
    pub scatter: Vec<ScatterPoint>,
    pub regressions: BTreeMap<Position, PositionRegression>,
    /// Inflation as the backend computed it, when that feed is available.
    pub server: Option<ServerInflation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Dashboard(Box<DashboardData>),
    Status(FetchStatus),
    Session { draft_id: String, is_live: bool },
}
