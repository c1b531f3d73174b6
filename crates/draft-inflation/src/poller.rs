// Polling controller: one cancellable fetch loop per subscription.
//
// A subscription is a (draft_id, is_live) pair. Starting or cancelling one
// aborts the previous task and bumps the generation counter; every event the
// task emits carries its generation so the app can drop anything left over
// from an aborted task, including events already queued on the channel. Fetches within one subscription run back to back, never
// overlapping.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::fetch::SnapshotFetcher;
use crate::protocol::PollEvent;

pub struct PollController {
    fetcher: Arc<SnapshotFetcher>,
    tx: mpsc::Sender<PollEvent>,
    interval: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl PollController {
    pub fn new(
        fetcher: Arc<SnapshotFetcher>,
        tx: mpsc::Sender<PollEvent>,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            tx,
            interval,
            generation: 0,
            task: None,
        }
    }

    /// Generation of the current (or most recent) subscription.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start polling a draft, replacing any existing subscription.
    ///
    /// Fetches once immediately. A live subscription then re-fetches every
    /// interval; a finished draft stops after the first fetch.
    pub fn start(&mut self, draft_id: &str, is_live: bool) -> u64 {
        self.spawn(draft_id, is_live, false)
    }

    /// Like `start`, but the first fetch always goes to the network and
    /// overwrites the cache, even for a finished draft.
    pub fn refresh(&mut self, draft_id: &str, is_live: bool) -> u64 {
        self.spawn(draft_id, is_live, true)
    }

    fn spawn(&mut self, draft_id: &str, is_live: bool, force_network: bool) -> u64 {
        self.cancel();
        let generation = self.generation;

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let interval = self.interval;
        let draft_id = draft_id.to_string();

        info!(
            "Polling draft {} (live: {}, forced: {}, gen: {})",
            draft_id, is_live, force_network, generation
        );
        self.task = Some(tokio::spawn(poll_loop(
            fetcher,
            tx,
            draft_id,
            is_live,
            force_network,
            interval,
            generation,
        )));
        generation
    }

    /// Abort the current subscription, dropping any in-flight request.
    ///
    /// Always retires the current generation, so results the aborted task
    /// already queued are stale by the time the app reads them.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
            info!("Cancelled poll task (gen: {})", self.generation);
        }
        self.generation += 1;
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }
}

async fn poll_loop(
    fetcher: Arc<SnapshotFetcher>,
    tx: mpsc::Sender<PollEvent>,
    draft_id: String,
    is_live: bool,
    mut force_network: bool,
    interval: Duration,
    generation: u64,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if tx.send(PollEvent::Started { generation }).await.is_err() {
            break;
        }

        let event = match fetcher.fetch(&draft_id, is_live || force_network).await {
            Ok(snapshot) => PollEvent::Fetched {
                generation,
                snapshot: Box::new(snapshot),
            },
            Err(e) => {
                warn!("Fetch failed for draft {}: {}", draft_id, e);
                PollEvent::Failed {
                    generation,
                    message: e.to_string(),
                }
            }
        };

        if tx.send(event).await.is_err() {
            break;
        }
        force_network = false;
        if !is_live {
            debug!("Draft {} is not live; stopping after one fetch", draft_id);
            break;
        }
    }
}
