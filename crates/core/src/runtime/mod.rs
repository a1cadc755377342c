//! Project session: owns the suggestion database, the path resolver and the
//! background tasks that keep them in step with the language server.

pub mod backoff;
pub mod computed;
pub mod synchronizer;

pub use backoff::{RetryError, retry_with_backoff};
pub use computed::{ComputedValueRegistry, ExpressionInfo, MethodCallInfo};
pub use synchronizer::{BatchAction, SyncStatus, Synchronizer, classify_batch};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::imports::{self, RequiredImport};
use crate::model::QualifiedName;
use crate::project::PathResolver;
use crate::suggestion::{SharedSuggestionDb, SuggestionDb, SuggestionId};
use futures::StreamExt;
use semscope_api::{LanguageServer, ProjectRenamed};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A live connection to one project.
///
/// Constructed explicitly with [`Session::start`]; nothing is global. All
/// background tasks stop on [`Session::shutdown`] or when the session is
/// dropped.
pub struct Session {
    connection: Arc<dyn LanguageServer>,

    /// Mirror of the server's suggestion database
    db: SharedSuggestionDb,

    /// Current project identity
    resolver: Arc<PathResolver>,

    /// Runtime information about evaluated expressions
    computed: Arc<ComputedValueRegistry>,

    status: watch::Receiver<SyncStatus>,

    /// Cancels the synchronizer, the rename listener and the expression consumer
    cancel_token: CancellationToken,

    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Start synchronizing with `connection`. Must be called from within a
    /// tokio runtime.
    pub fn start(
        connection: Arc<dyn LanguageServer>,
        project_name: QualifiedName,
        config: SessionConfig,
    ) -> Result<Self> {
        let resolver = Arc::new(PathResolver::new(project_name.clone())?);
        let db = SuggestionDb::shared();
        let cancel_token = CancellationToken::new();

        tracing::info!("Starting session for project {}", project_name);

        let synchronizer =
            Synchronizer::new(connection.clone(), db.clone(), resolver.clone(), config);
        let status = synchronizer.subscribe();

        let computed = Arc::new(ComputedValueRegistry::new(resolver.clone()));
        computed.start(connection.expression_updates(), &cancel_token);

        let tasks = vec![
            synchronizer.spawn(cancel_token.clone()),
            spawn_rename_listener(connection.as_ref(), resolver.clone(), cancel_token.clone()),
        ];

        Ok(Self {
            connection,
            db,
            resolver,
            computed,
            status,
            cancel_token,
            tasks: Mutex::new(tasks),
        })
    }

    pub fn db(&self) -> &SharedSuggestionDb {
        &self.db
    }

    pub fn resolver(&self) -> &Arc<PathResolver> {
        &self.resolver
    }

    pub fn computed_values(&self) -> &Arc<ComputedValueRegistry> {
        &self.computed
    }

    pub fn connection(&self) -> &Arc<dyn LanguageServer> {
        &self.connection
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Watch synchronizer progress, e.g. to wait for a particular version.
    pub fn status_receiver(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    pub fn current_version(&self) -> u64 {
        self.status.borrow().current_version
    }

    /// Resolve once the initial load has finished, or the synchronizer has
    /// stopped without finishing it.
    pub async fn wait_until_loaded(&self) -> SyncStatus {
        let mut status = self.status.clone();
        let loaded = status.wait_for(|s| s.loaded).await.map(|s| *s);
        loaded.unwrap_or_else(|_| *status.borrow())
    }

    /// Resolve once `version` (or a later one) has been applied.
    pub async fn wait_for_version(&self, version: u64) -> SyncStatus {
        let mut status = self.status.clone();
        let reached = status
            .wait_for(|s| s.loaded && s.current_version >= version)
            .await
            .map(|s| *s);
        reached.unwrap_or_else(|_| *status.borrow())
    }

    /// Start printing paths with `new_name` before the server confirms.
    pub fn request_project_rename(&self, new_name: QualifiedName) -> Result<()> {
        self.resolver.on_project_rename_requested(new_name)
    }

    /// Imports needed to reference the entry `id` by its short name.
    pub async fn required_imports(&self, id: SuggestionId) -> Option<Vec<RequiredImport>> {
        let db = self.db.read().await;
        let entry = db.get(id)?;
        Some(imports::required_imports(&db, &self.resolver, entry))
    }

    /// Stop all background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        self.computed.dispose();
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!("Session task failed: {}", e);
            }
        }
        tracing::info!("Session for {} shut down", self.resolver.project_name());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

fn spawn_rename_listener(
    connection: &dyn LanguageServer,
    resolver: Arc<PathResolver>,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    let mut renames = connection.project_renamed();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                event = renames.next() => match event {
                    Some(event) => apply_rename(&resolver, &event),
                    None => break,
                },
            }
        }
    })
}

fn apply_rename(resolver: &PathResolver, event: &ProjectRenamed) {
    let names = QualifiedName::parse(&event.old_project())
        .and_then(|old| Ok((old, QualifiedName::parse(&event.new_project())?)));
    match names {
        Ok((old, new)) => {
            resolver.on_project_renamed(&old, new);
        }
        Err(e) => tracing::warn!("Ignoring malformed project rename {:?}: {}", event, e),
    }
}
