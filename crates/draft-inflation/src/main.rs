// Inflation dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the snapshot cache database
// 4. Load local valuations
// 5. Build the HTTP client, fetcher and poll controller
// 6. Create mpsc channels
// 7. Spawn app logic task
// 8. Run the TUI until the user quits
// 9. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use draft_inflation::app;
use draft_inflation::config;
use draft_inflation::db;
use draft_inflation::fetch::{SnapshotCache, SnapshotFetcher};
use draft_inflation::poller::PollController;
use draft_inflation::remote::client::HttpDraftApi;
use draft_inflation::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Inflation dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: backend={}, {} teams, ${} budget, poll every {}s",
        config.server.base_url,
        config.draft.num_teams,
        config.draft.team_budget,
        config.polling.interval_secs
    );

    // 3. Open database
    let db_path = config::resolve_db_path(&config.cache);
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path_str = db_path.to_string_lossy().into_owned();
    let db = Arc::new(db::Database::open(&db_path_str).context("failed to open database")?);
    info!("Database opened at {}", db_path_str);

    // 4. Local valuations (optional CSV)
    let local_valuations = app::load_local_valuations(&config.valuations);

    // 5. HTTP client, fetcher, poll controller
    let api = HttpDraftApi::from_config(&config.server).context("failed to build HTTP client")?;
    let fetcher = Arc::new(SnapshotFetcher::new(
        Arc::new(api),
        SnapshotCache::new(Arc::clone(&db)),
    ));

    // 6. Channels
    let (poll_tx, poll_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let poller = PollController::new(
        fetcher,
        poll_tx,
        Duration::from_secs(config.polling.interval_secs),
    );
    let filter_defaults = config.filters;
    let app_state = app::AppState::new(config, db, local_valuations, poller);

    // 7. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(poll_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 8. Run the TUI event loop (blocks until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx, filter_defaults).await {
        error!("TUI error: {}", e);
    }

    // 9. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Inflation dashboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draft-inflation.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draft_inflation=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
