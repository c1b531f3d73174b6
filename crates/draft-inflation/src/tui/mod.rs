// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors what the app orchestrator has
// published. The orchestrator pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.
// Filters live here only: they narrow what is displayed and never reach
// the orchestrator.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::BTreeSet;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::FilterDefaults;
use crate::draft::pick::Position;
use crate::filter::FilterState;
use crate::protocol::{DashboardData, FetchStatus, TabId, UiUpdate, UserCommand};
use crate::valuation::inflation::AnnotatedPick;
use crate::valuation::table::Tier;

use layout::build_layout;

// ---------------------------------------------------------------------------
// Filter panel
// ---------------------------------------------------------------------------

/// Field focused in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    Teams,
    Positions,
    Tiers,
    Price,
    ExpectedPrice,
    Inflation,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Teams,
        FilterField::Positions,
        FilterField::Tiers,
        FilterField::Price,
        FilterField::ExpectedPrice,
        FilterField::Inflation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Teams => "Teams",
            FilterField::Positions => "Positions",
            FilterField::Tiers => "Tiers",
            FilterField::Price => "Price",
            FilterField::ExpectedPrice => "Expected",
            FilterField::Inflation => "Inflation %",
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterField::Price | FilterField::ExpectedPrice | FilterField::Inflation
        )
    }

    /// Step used when nudging a range bound.
    pub fn step(&self) -> f64 {
        match self {
            FilterField::Inflation => 5.0,
            _ => 1.0,
        }
    }

    pub fn next(&self) -> FilterField {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> FilterField {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPanel {
    pub field: FilterField,
    /// Option index within a set field.
    pub cursor: usize,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state, updated from `UiUpdate` messages and key presses.
pub struct ViewState {
    pub dashboard: Option<DashboardData>,
    pub status: FetchStatus,
    pub draft_id: String,
    pub is_live: bool,
    pub active_tab: TabId,
    pub filter: FilterState,
    /// Typing into the player-name filter.
    pub filter_mode: bool,
    pub filter_panel: Option<FilterPanel>,
    /// Draft id being typed, when the prompt is open.
    pub draft_prompt: Option<String>,
    pub confirm_quit: bool,
    /// Ticker shows every pick instead of the latest few.
    pub ticker_expanded: bool,
    /// Ticker scroll offset, or the selected team on the Teams tab.
    pub scroll_offset: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_filter_defaults(&FilterDefaults::default())
    }
}

impl ViewState {
    pub fn with_filter_defaults(defaults: &FilterDefaults) -> Self {
        ViewState {
            dashboard: None,
            status: FetchStatus::Idle,
            draft_id: String::new(),
            is_live: false,
            active_tab: TabId::Inflation,
            filter: FilterState::new(defaults),
            filter_mode: false,
            filter_panel: None,
            draft_prompt: None,
            confirm_quit: false,
            ticker_expanded: false,
            scroll_offset: 0,
        }
    }

    /// Picks passing the current filters, newest first.
    pub fn visible_picks(&self) -> Vec<&AnnotatedPick> {
        match &self.dashboard {
            Some(d) => self.filter.apply(&d.picks),
            None => Vec::new(),
        }
    }

    pub fn team_options(&self) -> Vec<String> {
        let Some(d) = &self.dashboard else {
            return Vec::new();
        };
        let mut names: Vec<String> = d.teams.iter().map(|t| t.team_name.clone()).collect();
        for pick in &d.picks {
            if !names.contains(&pick.team_name) {
                names.push(pick.team_name.clone());
            }
        }
        names
    }

    pub fn position_options(&self) -> Vec<Position> {
        let mut positions: BTreeSet<Position> = Position::STANDARD.into_iter().collect();
        if let Some(d) = &self.dashboard {
            positions.extend(d.picks.iter().map(|p| p.pick.position.clone()));
        }
        positions.into_iter().collect()
    }

    pub fn tier_options(&self) -> Vec<Tier> {
        let mut tiers: BTreeSet<Tier> = BTreeSet::new();
        tiers.insert(Tier::NotAvailable);
        if let Some(d) = &self.dashboard {
            tiers.extend(d.picks.iter().map(|p| p.tier));
        }
        tiers.into_iter().collect()
    }

    /// Number of options for a set field.
    pub fn option_count(&self, field: FilterField) -> usize {
        match field {
            FilterField::Teams => self.team_options().len(),
            FilterField::Positions => self.position_options().len(),
            FilterField::Tiers => self.tier_options().len(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Dashboard(dashboard) => {
            // Only the session's draft is shown.
            if dashboard.draft_id != state.draft_id {
                return;
            }
            if state.dashboard.as_ref().map(|d| &d.draft_id) != Some(&dashboard.draft_id) {
                state.scroll_offset = 0;
            }
            state.dashboard = Some(*dashboard);
        }
        UiUpdate::Status(status) => {
            state.status = status;
        }
        UiUpdate::Session { draft_id, is_live } => {
            if draft_id != state.draft_id {
                state.dashboard = None;
                state.scroll_offset = 0;
            }
            state.draft_id = draft_id;
            state.is_live = is_live;
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::tab_bar::render(frame, layout.tab_bar, state);

    match state.active_tab {
        TabId::Inflation => widgets::inflation::render(frame, layout.main_panel, state),
        TabId::Ticker => widgets::ticker::render(frame, layout.main_panel, state),
        TabId::Teams => widgets::teams::render(frame, layout.main_panel, state),
        TabId::Scatter => widgets::scatter::render(frame, layout.main_panel, state),
    }

    widgets::filter_bar::render(frame, layout.filter_bar, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.filter_panel.is_some() {
        widgets::filter_bar::render_panel(frame, layout.main_panel, state);
    }
    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Run the TUI until the user quits or the update channel closes.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    filter_defaults: FilterDefaults,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal before the default hook prints the panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::with_filter_defaults(&filter_defaults);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        info!("Terminal event stream error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::draft::pick::Pick;
    use crate::draft::team::{build_from_picks, LeagueShape};
    use crate::valuation::inflation::{
        aggregate, annotate_picks, ServerInflation, ServerPositionStat, ServerTierStat,
    };
    use crate::valuation::regression::{regressions_by_position, scatter_points};
    use crate::valuation::table::{ValuationEntry, ValuationTable};
    use chrono::Utc;

    /// A small but fully populated dashboard for render tests.
    pub(crate) fn sample_dashboard() -> DashboardData {
        let picks = vec![
            pick(1, 1, "Bijan Robinson", Position::RB, 62),
            pick(2, 2, "Ja'Marr Chase", Position::WR, 58),
            pick(3, 3, "Josh Allen", Position::QB, 30),
            pick(4, 1, "Travis Kelce", Position::TE, 25),
            pick(5, 2, "Breece Hall", Position::RB, 40),
            pick(6, 3, "Justin Tucker", Position::K, 1),
            pick(7, 1, "Unknown Guy", Position::Other("LB".into()), 1),
        ];
        let mut table = ValuationTable::new();
        for (name, price, tier) in [
            ("Bijan Robinson", 55.0, 1),
            ("Ja'Marr Chase", 60.0, 1),
            ("Josh Allen", 25.0, 1),
            ("Travis Kelce", 28.0, 2),
            ("Breece Hall", 35.0, 2),
            ("Justin Tucker", 1.0, 1),
        ] {
            table.insert(ValuationEntry {
                player_name: name.into(),
                expected_price: price,
                tier: Tier::Ranked(tier),
            });
        }
        let mut annotated = annotate_picks(&picks, &table, &[]);
        let report = aggregate(&annotated);
        let league = LeagueShape {
            num_teams: 3,
            team_budget: 200,
            bench_spots: 6,
            draft_order: vec![],
        };
        let scatter = scatter_points(&annotated);
        annotated.sort_by(|a, b| b.pick.pick_no.cmp(&a.pick.pick_no));

        let mut server = ServerInflation {
            overall: Some(7.5),
            ..Default::default()
        };
        server.positions.insert(
            Position::RB,
            ServerPositionStat {
                inflation: Some(11.1),
                picks: 2,
            },
        );
        server.tiers.entry(Position::RB).or_default().insert(
            Tier::Ranked(1),
            ServerTierStat {
                inflation: Some(-4.4),
                picks: 1,
                doe: Some(-2.0),
                avg_cost: Some(62.0),
            },
        );

        DashboardData {
            draft_id: "1122334455".into(),
            fetched_at: Utc::now(),
            from_cache: false,
            report,
            picks: annotated,
            teams: build_from_picks(&picks, &league),
            scatter,
            regressions: regressions_by_position(&picks),
            server: Some(server),
        }
    }

    fn pick(pick_no: u32, slot: u32, name: &str, pos: Position, price: u32) -> Pick {
        Pick {
            pick_no,
            draft_slot: slot,
            player_name: name.into(),
            position: pos,
            price,
        }
    }

    pub(crate) fn populated_state() -> ViewState {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::Session {
                draft_id: "1122334455".into(),
                is_live: true,
            },
        );
        apply_ui_update(&mut state, UiUpdate::Dashboard(Box::new(sample_dashboard())));
        apply_ui_update(&mut state, UiUpdate::Status(FetchStatus::Ready));
        state
    }

    fn draw(state: &ViewState, width: u16, height: u16) {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_frame(frame, state)).unwrap();
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.dashboard.is_none());
        assert_eq!(state.status, FetchStatus::Idle);
        assert_eq!(state.active_tab, TabId::Inflation);
        assert!(!state.filter_mode);
        assert!(state.filter_panel.is_none());
        assert!(state.draft_prompt.is_none());
        assert!(!state.confirm_quit);
        assert!(!state.filter.is_active());
        assert!(state.visible_picks().is_empty());
    }

    #[test]
    fn apply_dashboard_and_status() {
        let state = populated_state();
        assert_eq!(state.status, FetchStatus::Ready);
        assert_eq!(state.visible_picks().len(), 7);
        assert_eq!(state.visible_picks()[0].pick.pick_no, 7);
        assert!(state.is_live);
    }

    #[test]
    fn session_change_clears_dashboard() {
        let mut state = populated_state();
        state.scroll_offset = 3;
        apply_ui_update(
            &mut state,
            UiUpdate::Session {
                draft_id: "other".into(),
                is_live: false,
            },
        );
        assert!(state.dashboard.is_none());
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.draft_id, "other");
    }

    #[test]
    fn same_session_keeps_dashboard() {
        let mut state = populated_state();
        apply_ui_update(
            &mut state,
            UiUpdate::Session {
                draft_id: "1122334455".into(),
                is_live: false,
            },
        );
        assert!(state.dashboard.is_some());
        assert!(!state.is_live);
    }

    #[test]
    fn dashboard_for_other_draft_is_ignored() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::Session {
                draft_id: String::new(),
                is_live: false,
            },
        );
        apply_ui_update(&mut state, UiUpdate::Dashboard(Box::new(sample_dashboard())));
        assert!(state.dashboard.is_none());

        let mut state = populated_state();
        let mut other = sample_dashboard();
        other.draft_id = "999".into();
        other.picks.truncate(1);
        apply_ui_update(&mut state, UiUpdate::Dashboard(Box::new(other)));
        assert_eq!(state.visible_picks().len(), 7);
    }

    #[test]
    fn error_status_keeps_dashboard() {
        let mut state = populated_state();
        apply_ui_update(&mut state, UiUpdate::Status(FetchStatus::Error("down".into())));
        assert!(state.dashboard.is_some());
    }

    #[test]
    fn filter_options_come_from_dashboard() {
        let state = populated_state();
        assert_eq!(state.team_options(), vec!["Team 1", "Team 2", "Team 3"]);
        let positions = state.position_options();
        assert_eq!(positions.len(), 7);
        assert_eq!(positions[6], Position::Other("LB".into()));
        assert_eq!(
            state.tier_options(),
            vec![Tier::Ranked(1), Tier::Ranked(2), Tier::NotAvailable]
        );
    }

    #[test]
    fn filter_field_cycles() {
        assert_eq!(FilterField::Teams.next(), FilterField::Positions);
        assert_eq!(FilterField::Inflation.next(), FilterField::Teams);
        assert_eq!(FilterField::Teams.prev(), FilterField::Inflation);
        assert!(FilterField::Price.is_range());
        assert!(!FilterField::Tiers.is_range());
    }

    #[test]
    fn render_every_tab_empty_and_populated() {
        for state in [ViewState::default(), populated_state()] {
            let mut state = state;
            for tab in TabId::ALL {
                state.active_tab = tab;
                draw(&state, 120, 40);
                draw(&state, 40, 12);
            }
        }
    }

    #[test]
    fn render_overlays() {
        let mut state = populated_state();
        state.filter_panel = Some(FilterPanel::default());
        draw(&state, 100, 30);
        state.filter_panel = None;
        state.draft_prompt = Some("123".into());
        draw(&state, 100, 30);
        state.confirm_quit = true;
        draw(&state, 100, 30);
    }
}
