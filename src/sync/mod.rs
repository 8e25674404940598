//! Channel Sync Engine
//!
//! Reconciles one channel's message history against the listings store:
//! upsert by (channel_id, source_id), tombstone identities that fell out of
//! the visible window. A pass first iterates the remote history down to the
//! cutoff, then applies every write in a single transaction, so a failed
//! iteration can never tombstone listings it simply did not reach.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::RepositoryError;
use crate::extract::build_listing;
use crate::repositories::{ListingRepository, UpsertOutcome};
use crate::source::{MessageSource, SourceError};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Messages requested per page from the source.
    pub page_size: usize,
    /// Safety cap on messages inspected in one pass.
    pub max_messages_per_pass: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_messages_per_pass: 5000,
        }
    }
}

/// Outcome counters of one completed sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub channel_id: String,
    /// Messages inspected and recorded as seen (rejected ones included).
    pub seen: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub rejected: usize,
    pub tombstoned: u64,
}

/// Failures that abort a sync pass. Inserts and updates of an aborted pass
/// are rolled back together with the (never reached) deletion step.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("message source error: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Sync engine over one listings store and one message source.
pub struct ChannelSyncEngine {
    db: DatabaseConnection,
    source: Arc<dyn MessageSource>,
    config: EngineConfig,
    /// One async mutex per channel identity: passes over the same channel
    /// must not interleave, passes over different channels may.
    channel_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChannelSyncEngine {
    pub fn new(db: DatabaseConnection, source: Arc<dyn MessageSource>, config: EngineConfig) -> Self {
        Self {
            db,
            source,
            config,
            channel_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn channel_lock(&self, channel_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.channel_locks.lock().await;
        locks
            .entry(channel_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run one sync pass over a channel, back to `cutoff`.
    ///
    /// With `reset`, every persisted listing of the channel is purged before
    /// the pass (full re-import). Re-running a pass over an unchanged
    /// channel with the same cutoff leaves the store byte-identical.
    #[instrument(skip(self), fields(channel = %handle))]
    pub async fn sync_channel(
        &self,
        handle: &str,
        cutoff: DateTime<Utc>,
        reset: bool,
    ) -> Result<SyncSummary, SyncError> {
        let channel_num = self.source.resolve_channel(handle).await?;
        let channel_id = channel_num.to_string();

        let lock = self.channel_lock(&channel_id).await;
        let _guard = lock.lock().await;

        info!(%channel_id, %cutoff, reset, "starting sync pass");

        // Iterate the remote window completely before touching the store.
        let mut seen: HashSet<i64> = HashSet::new();
        let mut accepted = Vec::new();
        let mut rejected = 0usize;
        let mut cursor = None;

        'pages: loop {
            let page = self
                .source
                .fetch_page(channel_num, cursor, self.config.page_size)
                .await?;

            for message in &page.messages {
                if message.date < cutoff {
                    break 'pages;
                }
                // Media-only posts carry no text and are not "seen": their
                // identity never enters the tombstone delta.
                if message.text.is_empty() {
                    continue;
                }
                seen.insert(message.id);
                match build_listing(&message.text, message.id, &channel_id) {
                    Ok(parsed) => accepted.push(parsed),
                    Err(reason) => {
                        debug!(source_id = message.id, %reason, "message rejected");
                        rejected += 1;
                    }
                }
            }

            if !page.has_more {
                break;
            }
            if seen.len() >= self.config.max_messages_per_pass {
                warn!(
                    inspected = seen.len(),
                    cap = self.config.max_messages_per_pass,
                    "per-pass message cap reached before cutoff; older listings keep their state"
                );
                break;
            }
            // A page that claims more history but yields no cursor cannot
            // make progress.
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let mut inserted = 0usize;
        let mut updated = 0usize;
        let mut unchanged = 0usize;
        let tombstoned;

        // All writes of the pass commit together: upserts, the reset purge,
        // and the tombstone delta computed from the complete seen set.
        let txn = self.db.begin().await?;
        {
            let repo = ListingRepository::new(&txn);

            if reset {
                let purged = repo.purge_channel(&channel_id).await?;
                if purged > 0 {
                    info!(%channel_id, purged, "reset: purged persisted listings");
                }
            }

            for parsed in &accepted {
                match repo.upsert_parsed(parsed).await? {
                    UpsertOutcome::Inserted => inserted += 1,
                    UpsertOutcome::Updated => updated += 1,
                    UpsertOutcome::Unchanged => unchanged += 1,
                }
            }

            let active = repo.active_source_ids(&channel_id).await?;
            let stale: Vec<i64> = active.difference(&seen).copied().collect();
            tombstoned = repo.mark_deleted(&channel_id, &stale).await?;
        }
        txn.commit().await?;

        let labels = vec![("channel", channel_id.clone())];
        counter!("rentfeed_listings_upserted_total", &labels)
            .increment((inserted + updated) as u64);
        counter!("rentfeed_listings_tombstoned_total", &labels).increment(tombstoned);
        counter!("rentfeed_messages_rejected_total", &labels).increment(rejected as u64);

        let summary = SyncSummary {
            channel_id,
            seen: seen.len(),
            inserted,
            updated,
            unchanged,
            rejected,
            tombstoned,
        };
        info!(
            seen = summary.seen,
            inserted,
            updated,
            unchanged,
            rejected,
            tombstoned,
            "sync pass finished"
        );
        Ok(summary)
    }
}
