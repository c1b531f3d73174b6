// Snapshot fetching with a per-draft SQLite cache.
//
// A snapshot is everything the dashboard shows for one draft at one moment:
// the required feeds (picks, valuations) and the optional ones (server-side
// inflation, team breakdown, scatter). Finished drafts are served from the
// cache; live drafts always hit the network and refresh the cache.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::draft::pick::Pick;
use crate::remote::client::{ApiError, DraftApi};
use crate::remote::payload::{InflationPayload, ScatterPayload, TeamBreakdownPayload};
use crate::valuation::table::ValuationEntry;

// ---------------------------------------------------------------------------
// Feeds and snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Picks,
    Valuations,
    Inflation,
    TeamBreakdown,
    Scatter,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Picks => "picks",
            Feed::Valuations => "valuations",
            Feed::Inflation => "inflation",
            Feed::TeamBreakdown => "team_breakdown",
            Feed::Scatter => "scatter",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Network,
    Cache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub draft_id: String,
    pub picks: Vec<Pick>,
    pub valuations: Vec<ValuationEntry>,
    pub server_inflation: Option<InflationPayload>,
    pub team_breakdown: Option<TeamBreakdownPayload>,
    pub scatter: Option<ScatterPayload>,
    pub fetched_at: DateTime<Utc>,
    pub source: SnapshotSource,
}

// ---------------------------------------------------------------------------
// SnapshotCache
// ---------------------------------------------------------------------------

/// Per-draft snapshot storage on top of [`Database`].
///
/// Each feed is stored separately. A snapshot is only considered cached
/// when both required feeds are present.
#[derive(Clone)]
pub struct SnapshotCache {
    db: Arc<Database>,
}

impl SnapshotCache {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn load_feed<T: DeserializeOwned>(
        &self,
        draft_id: &str,
        feed: Feed,
    ) -> Result<Option<(T, DateTime<Utc>)>> {
        let Some(cached) = self.db.load_feed(draft_id, feed.as_str())? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&cached.payload)
            .with_context(|| format!("corrupt cached {feed} feed for draft {draft_id}"))?;
        Ok(Some((value, cached.fetched_at)))
    }

    fn save_feed<T: Serialize>(
        &self,
        draft_id: &str,
        feed: Feed,
        value: &T,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        let payload = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize {feed} feed"))?;
        self.db.save_feed(draft_id, feed.as_str(), &payload, fetched_at)
    }

    /// Load the cached snapshot for a draft, or `None` if either required
    /// feed is missing. `fetched_at` is the picks feed's timestamp.
    pub fn load(&self, draft_id: &str) -> Result<Option<Snapshot>> {
        let Some((picks, fetched_at)) = self.load_feed::<Vec<Pick>>(draft_id, Feed::Picks)? else {
            return Ok(None);
        };
        let Some((valuations, _)) = self.load_feed(draft_id, Feed::Valuations)? else {
            return Ok(None);
        };
        Ok(Some(Snapshot {
            draft_id: draft_id.to_string(),
            picks,
            valuations,
            server_inflation: self.load_feed(draft_id, Feed::Inflation)?.map(|(v, _)| v),
            team_breakdown: self.load_feed(draft_id, Feed::TeamBreakdown)?.map(|(v, _)| v),
            scatter: self.load_feed(draft_id, Feed::Scatter)?.map(|(v, _)| v),
            fetched_at,
            source: SnapshotSource::Cache,
        }))
    }

    /// Store every feed present in the snapshot. Optional feeds that are
    /// `None` leave any earlier cached copy untouched.
    pub fn store(&self, snapshot: &Snapshot) -> Result<()> {
        let id = &snapshot.draft_id;
        let at = snapshot.fetched_at;
        self.save_feed(id, Feed::Picks, &snapshot.picks, at)?;
        self.save_feed(id, Feed::Valuations, &snapshot.valuations, at)?;
        if let Some(inflation) = &snapshot.server_inflation {
            self.save_feed(id, Feed::Inflation, inflation, at)?;
        }
        if let Some(teams) = &snapshot.team_breakdown {
            self.save_feed(id, Feed::TeamBreakdown, teams, at)?;
        }
        if let Some(scatter) = &snapshot.scatter {
            self.save_feed(id, Feed::Scatter, scatter, at)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SnapshotFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no draft id set")]
    EmptyDraftId,

    #[error("failed to fetch {feed}: {source}")]
    Feed { feed: Feed, source: ApiError },
}

/// Fetches snapshots through the cache.
pub struct SnapshotFetcher {
    api: Arc<dyn DraftApi>,
    cache: SnapshotCache,
}

impl SnapshotFetcher {
    pub fn new(api: Arc<dyn DraftApi>, cache: SnapshotCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Return the latest snapshot for a draft.
    ///
    /// When not live, a cached snapshot is returned without touching the
    /// network. Otherwise picks and the player lookup are fetched (both
    /// required), the optional feeds are fetched concurrently, and the
    /// result is written back to the cache.
    pub async fn fetch(&self, draft_id: &str, is_live: bool) -> Result<Snapshot, FetchError> {
        let draft_id = draft_id.trim();
        if draft_id.is_empty() {
            return Err(FetchError::EmptyDraftId);
        }

        if !is_live {
            match self.cache.load(draft_id) {
                Ok(Some(snapshot)) => {
                    debug!("Serving draft {} from cache", draft_id);
                    return Ok(snapshot);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cache for draft {}: {:#}", draft_id, e),
            }
        }

        let picks = self
            .api
            .picks(draft_id)
            .await
            .map_err(|source| FetchError::Feed {
                feed: Feed::Picks,
                source,
            })?;

        let valuations = if picks.is_empty() {
            Vec::new()
        } else {
            let names: Vec<String> = picks.iter().map(|p| p.player_name.clone()).collect();
            self.api
                .player_lookup(&names)
                .await
                .map_err(|source| FetchError::Feed {
                    feed: Feed::Valuations,
                    source,
                })?
        };

        let (inflation, teams, scatter) = tokio::join!(
            self.api.inflation(draft_id),
            self.api.team_breakdown(draft_id, is_live),
            self.api.scatter_data(draft_id, is_live),
        );

        let snapshot = Snapshot {
            draft_id: draft_id.to_string(),
            picks,
            valuations,
            server_inflation: optional_feed(Feed::Inflation, inflation),
            team_breakdown: optional_feed(Feed::TeamBreakdown, teams),
            scatter: optional_feed(Feed::Scatter, scatter),
            fetched_at: Utc::now(),
            source: SnapshotSource::Network,
        };

        info!(
            "Fetched draft {}: {} picks, {} valuations",
            draft_id,
            snapshot.picks.len(),
            snapshot.valuations.len()
        );

        if let Err(e) = self.cache.store(&snapshot) {
            warn!("Failed to cache draft {}: {:#}", draft_id, e);
        }

        Ok(snapshot)
    }
}

fn optional_feed<T>(feed: Feed, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Optional {} feed unavailable: {}", feed, e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
