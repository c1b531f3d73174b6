// Application state and orchestration logic.
//
// The central event loop that coordinates poll results from the polling
// controller and user commands from the TUI. Owns the current snapshot,
// derives dashboard data from it, and pushes UI updates to the TUI.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use std::sync::Arc;

use crate::config::{Config, ValuationsConfig};
use crate::db::Database;
use crate::draft::team;
use crate::fetch::{Snapshot, SnapshotSource};
use crate::poller::PollController;
use crate::protocol::{DashboardData, FetchStatus, PollEvent, UiUpdate, UserCommand};
use crate::valuation::inflation;
use crate::valuation::regression;
use crate::valuation::table::{self, ValuationTable};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub draft_id: String,
    pub is_live: bool,
    /// Valuations from the local CSV, overlaid by each snapshot's lookup.
    pub local_valuations: ValuationTable,
    /// Last snapshot received for the current draft.
    pub snapshot: Option<Snapshot>,
    pub fetch_status: FetchStatus,
    pub poller: PollController,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<Database>,
        local_valuations: ValuationTable,
        poller: PollController,
    ) -> Self {
        let (draft_id, is_live) = resume_session(&config, &db);
        Self {
            config,
            db,
            draft_id,
            is_live,
            local_valuations,
            snapshot: None,
            fetch_status: FetchStatus::Idle,
            poller,
        }
    }

    /// (Re)start polling for the current session. An empty draft id just
    /// stops polling. `force_network` skips the cache for the first fetch.
    fn restart_polling(&mut self, force_network: bool) {
        if self.draft_id.is_empty() {
            self.poller.cancel();
            self.fetch_status = FetchStatus::Idle;
            return;
        }
        if force_network {
            self.poller.refresh(&self.draft_id, self.is_live);
        } else {
            self.poller.start(&self.draft_id, self.is_live);
        }
    }

    fn persist_session(&self) {
        if let Err(e) = self.db.set_draft_id(&self.draft_id) {
            warn!("Failed to persist draft id: {:#}", e);
        }
        if let Err(e) = self.db.set_is_live(self.is_live) {
            warn!("Failed to persist live flag: {:#}", e);
        }
    }
}

/// Pick the starting session: values persisted from the last run win over
/// the configured ones.
pub fn resume_session(config: &Config, db: &Database) -> (String, bool) {
    let draft_id = match db.get_draft_id() {
        Ok(Some(id)) if !id.trim().is_empty() => id,
        Ok(_) => config.draft.draft_id.trim().to_string(),
        Err(e) => {
            warn!("Failed to read saved draft id: {:#}", e);
            config.draft.draft_id.trim().to_string()
        }
    };
    let is_live = match db.get_is_live() {
        Ok(Some(live)) => live,
        Ok(None) => config.draft.is_live,
        Err(e) => {
            warn!("Failed to read saved live flag: {:#}", e);
            config.draft.is_live
        }
    };
    (draft_id, is_live)
}

/// Build the local valuation table from the configured CSV and aliases.
/// A missing or unreadable CSV leaves the table empty.
pub fn load_local_valuations(config: &ValuationsConfig) -> ValuationTable {
    let mut table = ValuationTable::with_aliases(&config.aliases);
    if let Some(path) = &config.csv_path {
        match table::load_csv(path) {
            Ok(entries) => {
                info!("Loaded {} valuations from {}", entries.len(), path.display());
                table.extend(entries);
            }
            Err(e) => warn!("Skipping local valuations: {}", e),
        }
    }
    table
}

// ---------------------------------------------------------------------------
// Dashboard derivation
// ---------------------------------------------------------------------------

/// Derive everything the TUI shows from one snapshot.
pub fn build_dashboard(
    snapshot: &Snapshot,
    local_valuations: &ValuationTable,
    config: &Config,
) -> DashboardData {
    let mut valuations = local_valuations.clone();
    valuations.extend(snapshot.valuations.iter().cloned());

    let (mut picks, report) =
        inflation::compute(&snapshot.picks, &valuations, &config.draft.draft_order);
    if !report.unmatched.is_empty() {
        debug!(
            "{} picks without a valuation: {}",
            report.unmatched.len(),
            report.unmatched.join(", ")
        );
    }

    let league = config.draft.league_shape();
    let teams = match &snapshot.team_breakdown {
        Some(payload) if !payload.is_empty() => team::build_from_payload(payload, &league),
        _ => team::build_from_picks(&snapshot.picks, &league),
    };

    let scatter = regression::scatter_points(&picks);
    let mut regressions = regression::regressions_by_position(&snapshot.picks);
    if let Some(server) = &snapshot.scatter {
        regression::merge_server_regressions(&mut regressions, server);
    }

    picks.sort_by(|a, b| b.pick.pick_no.cmp(&a.pick.pick_no));

    DashboardData {
        draft_id: snapshot.draft_id.clone(),
        fetched_at: snapshot.fetched_at,
        from_cache: snapshot.source == SnapshotSource::Cache,
        report,
        picks,
        teams,
        scatter,
        regressions,
        server: snapshot
            .server_inflation
            .as_ref()
            .map(inflation::ServerInflation::from_payload),
    }
}

/// Fill optional feeds the new snapshot lacks from the previous one of the
/// same draft.
fn carry_optional_feeds(mut next: Snapshot, previous: Option<&Snapshot>) -> Snapshot {
    let Some(prev) = previous.filter(|p| p.draft_id == next.draft_id) else {
        return next;
    };
    if next.server_inflation.is_none() {
        next.server_inflation = prev.server_inflation.clone();
    }
    if next.team_breakdown.is_none() {
        next.team_breakdown = prev.team_breakdown.clone();
    }
    if next.scatter.is_none() {
        next.scatter = prev.scatter.clone();
    }
    next
}

// ---------------------------------------------------------------------------
// Event handlers
// ---------------------------------------------------------------------------

/// Send an update to the TUI. A closed channel means the TUI has exited.
async fn publish(ui_tx: &mpsc::Sender<UiUpdate>, update: UiUpdate) {
    if ui_tx.send(update).await.is_err() {
        debug!("UI channel closed; update dropped");
    }
}

async fn set_status(state: &mut AppState, status: FetchStatus, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.fetch_status = status.clone();
    publish(ui_tx, UiUpdate::Status(status)).await;
}

/// Handle one poll event.
///
/// Events whose generation doesn't match the poller's current one come
/// from an aborted subscription and are dropped. A failed fetch sets the
/// error status but leaves the last good dashboard on screen.
pub async fn handle_poll_event(
    state: &mut AppState,
    event: PollEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let current = state.poller.generation();
    if event.generation() != current {
        debug!(
            "Discarding stale poll event (event gen: {}, current gen: {})",
            event.generation(),
            current
        );
        return;
    }

    match event {
        PollEvent::Started { .. } => {
            set_status(state, FetchStatus::Loading, ui_tx).await;
        }
        PollEvent::Fetched { snapshot, .. } => {
            let snapshot = carry_optional_feeds(*snapshot, state.snapshot.as_ref());
            let dashboard = build_dashboard(&snapshot, &state.local_valuations, &state.config);
            info!(
                "Draft {}: {} picks, overall inflation {:.1}%",
                snapshot.draft_id, dashboard.report.total_picks, dashboard.report.overall_inflation
            );
            state.snapshot = Some(snapshot);
            publish(ui_tx, UiUpdate::Dashboard(Box::new(dashboard))).await;
            set_status(state, FetchStatus::Ready, ui_tx).await;
        }
        PollEvent::Failed { message, .. } => {
            set_status(state, FetchStatus::Error(message), ui_tx).await;
        }
    }
}

/// Handle a user command. Returns `true` if the app should quit.
pub async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) -> bool {
    match cmd {
        UserCommand::Quit => {
            info!("Quit requested");
            return true;
        }
        UserCommand::ToggleLive => {
            state.is_live = !state.is_live;
            info!("Live mode {}", if state.is_live { "on" } else { "off" });
            state.persist_session();
            state.restart_polling(false);
        }
        UserCommand::SetDraftId(id) => {
            let id = id.trim().to_string();
            if id != state.draft_id {
                info!("Switching to draft {:?}", id);
                state.draft_id = id;
                state.snapshot = None;
            }
            state.persist_session();
            state.restart_polling(false);
        }
        UserCommand::Refresh => {
            state.restart_polling(true);
        }
    }

    publish(
        ui_tx,
        UiUpdate::Session {
            draft_id: state.draft_id.clone(),
            is_live: state.is_live,
        },
    )
    .await;
    if state.draft_id.is_empty() {
        set_status(state, FetchStatus::Idle, ui_tx).await;
    }
    false
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until the user quits or the command
/// channel closes.
pub async fn run(
    mut poll_rx: mpsc::Receiver<PollEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    publish(
        &ui_tx,
        UiUpdate::Session {
            draft_id: state.draft_id.clone(),
            is_live: state.is_live,
        },
    )
    .await;
    state.restart_polling(false);

    loop {
        tokio::select! {
            event = poll_rx.recv() => {
                match event {
                    Some(event) => handle_poll_event(&mut state, event, &ui_tx).await,
                    None => {
                        warn!("Poll channel closed");
                        break;
                    }
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        if handle_user_command(&mut state, cmd, &ui_tx).await {
                            break;
                        }
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.poller.cancel();
    info!("Application event loop exited");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
