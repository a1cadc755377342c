//! Recorded language-server traffic replayed through a [`Session`].

use semscope_api::{LibraryComponentGroup, SuggestionsDatabaseSnapshot, SuggestionsDatabaseUpdates};
use semscope_core::model::QualifiedName;
use semscope_core::suggestion::SuggestionId;
use semscope_core::{InMemoryLanguageServer, Session, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const REPLAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// `namespace.name` of the project the traffic belongs to.
    pub project: String,
    pub snapshot: SuggestionsDatabaseSnapshot,
    #[serde(default)]
    pub component_groups: Vec<LibraryComponentGroup>,
    /// Update batches in the order the server sent them.
    #[serde(default)]
    pub updates: Vec<SuggestionsDatabaseUpdates>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read fixture {}: {}", path.display(), e))?;
        let fixture = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid fixture {}: {}", path.display(), e))?;
        Ok(fixture)
    }

    fn final_version(&self) -> u64 {
        self.updates
            .iter()
            .map(|batch| batch.current_version)
            .chain(std::iter::once(self.snapshot.current_version))
            .max()
            .unwrap_or_default()
    }

    /// Start a session over the fixture and wait until every batch is applied.
    pub async fn replay(&self) -> Result<Session, Box<dyn std::error::Error>> {
        let project = QualifiedName::parse(&self.project)?;
        let server = Arc::new(InMemoryLanguageServer::with_snapshot(self.snapshot.clone()));
        server.set_groups(self.component_groups.clone());
        for batch in &self.updates {
            server.push_updates(batch.clone());
        }

        let session = Session::start(server, project, SessionConfig::from_env())?;
        let target = self.final_version();
        match tokio::time::timeout(REPLAY_TIMEOUT, session.wait_for_version(target)).await {
            Ok(status) if status.current_version >= target => {}
            Ok(status) => tracing::warn!(
                "Replay stopped at version {} before reaching {}",
                status.current_version,
                target
            ),
            Err(_) => tracing::warn!("Replay did not reach version {} in time", target),
        }
        Ok(session)
    }
}

/// Ids of the suggestions defined at `name`.
pub async fn find(
    session: &Session,
    name: &str,
) -> Result<Vec<SuggestionId>, Box<dyn std::error::Error>> {
    let path = session.resolver().parse_project_path_str(name)?;
    let ids = session.db().read().await.find_all_by_project_path(&path);
    if ids.is_empty() {
        return Err(format!("No suggestion defined at {}", name).into());
    }
    Ok(ids)
}
