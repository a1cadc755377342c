//! Keeps a [`SuggestionDb`] in step with the language server.
//!
//! The synchronizer is the only writer of the database. It loads the initial
//! snapshot, then applies update batches strictly one at a time, each under a
//! single write guard so readers only ever see whole batches.

use super::backoff::{RetryError, retry_with_backoff};
use crate::config::SessionConfig;
use crate::project::PathResolver;
use crate::suggestion::translate::entry_from_record;
use crate::suggestion::{SharedSuggestionDb, SuggestionDb};
use futures::StreamExt;
use futures::stream::BoxStream;
use semscope_api::{
    LanguageServer, RECEIVES_SUGGESTIONS_DATABASE_UPDATES, SuggestionsDatabaseSnapshot,
    SuggestionsDatabaseUpdates,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Observable progress of the synchronizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// Set once the initial load finished, successfully or not.
    pub loaded: bool,
    /// Version of the last applied snapshot or batch.
    pub current_version: u64,
    /// The snapshot or the update capability could not be obtained.
    pub degraded: bool,
}

/// What to do with an incoming batch, given the current version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    /// Older than what is applied already.
    Discard,
    /// Same version again; applied anyway.
    ApplyDuplicate,
    Apply,
    /// Skips at least one version.
    ApplyAfterGap,
    /// Skips versions and the session reloads the snapshot instead.
    Resync,
}

pub fn classify_batch(current: u64, incoming: u64, resync_on_gap: bool) -> BatchAction {
    if incoming < current {
        BatchAction::Discard
    } else if incoming == current {
        BatchAction::ApplyDuplicate
    } else if incoming == current + 1 {
        BatchAction::Apply
    } else if resync_on_gap {
        BatchAction::Resync
    } else {
        BatchAction::ApplyAfterGap
    }
}

pub struct Synchronizer {
    connection: Arc<dyn LanguageServer>,
    db: SharedSuggestionDb,
    resolver: Arc<PathResolver>,
    config: SessionConfig,
    status: watch::Sender<SyncStatus>,
}

impl Synchronizer {
    pub fn new(
        connection: Arc<dyn LanguageServer>,
        db: SharedSuggestionDb,
        resolver: Arc<PathResolver>,
        config: SessionConfig,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            connection,
            db,
            resolver,
            config,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    pub async fn run(self, cancel: CancellationToken) {
        // Subscribe before loading so no batch sent during the load is lost.
        let updates = self.connection.suggestion_updates();

        let capability = retry_with_backoff(
            "Acquiring suggestion update capability",
            &self.config.backoff,
            &cancel,
            || {
                self.connection.acquire_capability(
                    RECEIVES_SUGGESTIONS_DATABASE_UPDATES,
                    serde_json::json!({}),
                )
            },
        )
        .await;
        let mut degraded = false;
        match capability {
            Ok(()) => {}
            Err(RetryError::Cancelled) => return,
            Err(e) => {
                tracing::error!(
                    "Could not acquire suggestion updates, database will go stale: {}",
                    e
                );
                degraded = true;
            }
        }

        let groups = retry_with_backoff(
            "Fetching component groups",
            &self.config.backoff,
            &cancel,
            || self.connection.get_component_groups(),
        )
        .await;
        match groups {
            Ok(groups) => {
                self.db.write().await.set_groups(groups.component_groups);
            }
            Err(RetryError::Cancelled) => return,
            Err(e) => tracing::warn!("Continuing without component groups: {}", e),
        }

        let mut current_version = match self.load_snapshot(&cancel).await {
            Ok(version) => version,
            Err(RetryError::Cancelled) => return,
            Err(e) => {
                tracing::error!("Initial suggestion database load failed: {}", e);
                degraded = true;
                0
            }
        };
        self.status.send_replace(SyncStatus {
            loaded: true,
            current_version,
            degraded,
        });

        self.consume(updates, &mut current_version, &cancel).await;
        tracing::info!("Suggestion database synchronizer stopped");
    }

    async fn consume(
        &self,
        mut updates: BoxStream<'static, SuggestionsDatabaseUpdates>,
        current_version: &mut u64,
        cancel: &CancellationToken,
    ) {
        loop {
            let batch = tokio::select! {
                _ = cancel.cancelled() => break,
                batch = updates.next() => match batch {
                    Some(batch) => batch,
                    None => break,
                },
            };

            let incoming = batch.current_version;
            match classify_batch(*current_version, incoming, self.config.resync_on_gap) {
                BatchAction::Discard => {
                    tracing::info!(
                        "Discarding stale update batch {} (current {})",
                        incoming,
                        current_version
                    );
                    continue;
                }
                BatchAction::ApplyDuplicate => {
                    tracing::warn!("Update batch {} received again; applying", incoming);
                }
                BatchAction::ApplyAfterGap => {
                    tracing::warn!(
                        "Update batch {} skips versions after {}",
                        incoming,
                        current_version
                    );
                }
                BatchAction::Resync => {
                    tracing::warn!(
                        "Update batch {} skips versions after {}; reloading snapshot",
                        incoming,
                        current_version
                    );
                    match self.load_snapshot(cancel).await {
                        Ok(version) => self.advance(current_version, version),
                        Err(RetryError::Cancelled) => break,
                        Err(e) => tracing::error!("Snapshot reload failed: {}", e),
                    }
                    continue;
                }
                BatchAction::Apply => {}
            }

            self.apply_batch(&batch).await;
            self.advance(current_version, incoming);
        }
    }

    fn advance(&self, current_version: &mut u64, version: u64) {
        *current_version = (*current_version).max(version);
        let version = *current_version;
        self.status.send_modify(|status| status.current_version = version);
    }

    async fn apply_batch(&self, batch: &SuggestionsDatabaseUpdates) {
        let mut db = self.db.write().await;
        for update in &batch.updates {
            if let Err(e) = db.apply_update(update, &self.resolver) {
                tracing::warn!(
                    "Skipping update of entry {} in batch {}: {}",
                    update.id(),
                    batch.current_version,
                    e
                );
            } else {
                tracing::trace!("Applied update of entry {}", update.id());
            }
        }
        tracing::debug!(
            "Applied update batch {} ({} updates)",
            batch.current_version,
            batch.updates.len()
        );
    }

    /// Fetch the full database and replace the local one. Returns the
    /// snapshot's version.
    async fn load_snapshot(&self, cancel: &CancellationToken) -> Result<u64, RetryError> {
        let snapshot = retry_with_backoff(
            "Fetching suggestion database",
            &self.config.backoff,
            cancel,
            || self.connection.get_suggestions_database(),
        )
        .await?;
        let version = snapshot.current_version;
        let mut db = self.db.write().await;
        load_into(&mut db, snapshot, &self.resolver);
        tracing::info!(
            "Suggestion database loaded: {} entries at version {}",
            db.len(),
            version
        );
        Ok(version)
    }
}

/// Replace all entries with the snapshot's, skipping malformed records.
fn load_into(db: &mut SuggestionDb, snapshot: SuggestionsDatabaseSnapshot, resolver: &PathResolver) {
    let mut skipped = 0usize;
    let entries: Vec<_> = snapshot
        .entries
        .into_iter()
        .filter_map(|entry| {
            match entry_from_record(&entry.suggestion, resolver, db.groups()) {
                Ok(translated) => Some((entry.id, translated)),
                Err(e) => {
                    tracing::warn!("Skipping malformed suggestion {}: {}", entry.id, e);
                    skipped += 1;
                    None
                }
            }
        })
        .collect();
    if skipped > 0 {
        tracing::warn!("{} malformed suggestions skipped", skipped);
    }
    db.replace_all(entries);
}
