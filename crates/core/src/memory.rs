//! A scripted [`LanguageServer`] for tests, fixtures and offline tooling.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use semscope_api::{
    ApiError, ApiResult, ComponentGroups, ExpressionUpdate, LanguageServer, LibraryComponentGroup,
    ProjectRenamed, SuggestionsDatabaseSnapshot, SuggestionsDatabaseUpdates,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// A notification feed. Items pushed before anyone subscribed are kept and
/// delivered to the first subscriber.
struct Feed<T> {
    senders: Vec<mpsc::UnboundedSender<T>>,
    backlog: Vec<T>,
    closed: bool,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
            backlog: Vec::new(),
            closed: false,
        }
    }
}

impl<T: Clone + Send + 'static> Feed<T> {
    fn push(&mut self, item: T) {
        self.senders.retain(|tx| !tx.is_closed());
        if self.senders.is_empty() {
            self.backlog.push(item);
            return;
        }
        for tx in &self.senders {
            let _ = tx.send(item.clone());
        }
    }

    fn subscribe(&mut self) -> BoxStream<'static, T> {
        let (tx, rx) = mpsc::unbounded_channel();
        for item in self.backlog.drain(..) {
            let _ = tx.send(item);
        }
        if !self.closed {
            self.senders.push(tx);
        }
        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed()
    }

    fn close(&mut self) {
        self.closed = true;
        self.senders.clear();
    }
}

#[derive(Default)]
struct ServerState {
    snapshot: SuggestionsDatabaseSnapshot,
    groups: Vec<LibraryComponentGroup>,
    capability_failures: u32,
    snapshot_failures: u32,
    groups_failures: u32,
    capability_requests: u32,
    snapshot_requests: u32,
    disconnected: bool,
}

#[derive(Default)]
pub struct InMemoryLanguageServer {
    state: Mutex<ServerState>,
    suggestions: Mutex<Feed<SuggestionsDatabaseUpdates>>,
    expressions: Mutex<Feed<Vec<ExpressionUpdate>>>,
    renames: Mutex<Feed<ProjectRenamed>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn request_failed(method: &str) -> ApiError {
    ApiError::RequestFailed {
        method: method.to_string(),
        reason: "injected failure".to_string(),
    }
}

impl InMemoryLanguageServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SuggestionsDatabaseSnapshot) -> Self {
        let server = Self::new();
        server.set_snapshot(snapshot);
        server
    }

    pub fn set_snapshot(&self, snapshot: SuggestionsDatabaseSnapshot) {
        lock(&self.state).snapshot = snapshot;
    }

    pub fn set_groups(&self, groups: Vec<LibraryComponentGroup>) {
        lock(&self.state).groups = groups;
    }

    /// Fail the next `times` capability requests.
    pub fn fail_capability(&self, times: u32) {
        lock(&self.state).capability_failures = times;
    }

    /// Fail the next `times` snapshot requests.
    pub fn fail_snapshot(&self, times: u32) {
        lock(&self.state).snapshot_failures = times;
    }

    pub fn fail_groups(&self, times: u32) {
        lock(&self.state).groups_failures = times;
    }

    pub fn capability_requests(&self) -> u32 {
        lock(&self.state).capability_requests
    }

    pub fn snapshot_requests(&self) -> u32 {
        lock(&self.state).snapshot_requests
    }

    pub fn push_updates(&self, batch: SuggestionsDatabaseUpdates) {
        lock(&self.suggestions).push(batch);
    }

    pub fn push_expression_updates(&self, updates: Vec<ExpressionUpdate>) {
        lock(&self.expressions).push(updates);
    }

    pub fn push_rename(&self, event: ProjectRenamed) {
        lock(&self.renames).push(event);
    }

    /// Dispose the connection: requests fail and notification streams end.
    pub fn disconnect(&self) {
        lock(&self.state).disconnected = true;
        lock(&self.suggestions).close();
        lock(&self.expressions).close();
        lock(&self.renames).close();
    }
}

#[async_trait]
impl LanguageServer for InMemoryLanguageServer {
    async fn acquire_capability(&self, method: &str, _params: serde_json::Value) -> ApiResult<()> {
        let mut state = lock(&self.state);
        state.capability_requests += 1;
        if state.disconnected {
            return Err(ApiError::Disconnected);
        }
        if state.capability_failures > 0 {
            state.capability_failures -= 1;
            return Err(ApiError::CapabilityDenied {
                method: method.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    async fn get_suggestions_database(&self) -> ApiResult<SuggestionsDatabaseSnapshot> {
        let mut state = lock(&self.state);
        state.snapshot_requests += 1;
        if state.disconnected {
            return Err(ApiError::Disconnected);
        }
        if state.snapshot_failures > 0 {
            state.snapshot_failures -= 1;
            return Err(request_failed("search/getSuggestionsDatabase"));
        }
        Ok(state.snapshot.clone())
    }

    async fn get_component_groups(&self) -> ApiResult<ComponentGroups> {
        let mut state = lock(&self.state);
        if state.disconnected {
            return Err(ApiError::Disconnected);
        }
        if state.groups_failures > 0 {
            state.groups_failures -= 1;
            return Err(request_failed("executionContext/getComponentGroups"));
        }
        Ok(ComponentGroups {
            component_groups: state.groups.clone(),
        })
    }

    fn suggestion_updates(&self) -> BoxStream<'static, SuggestionsDatabaseUpdates> {
        lock(&self.suggestions).subscribe()
    }

    fn expression_updates(&self) -> BoxStream<'static, Vec<ExpressionUpdate>> {
        lock(&self.expressions).subscribe()
    }

    fn project_renamed(&self) -> BoxStream<'static, ProjectRenamed> {
        lock(&self.renames).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backlog_reaches_first_subscriber() {
        let server = InMemoryLanguageServer::new();
        server.push_updates(SuggestionsDatabaseUpdates {
            current_version: 1,
            updates: vec![],
        });
        let mut stream = server.suggestion_updates();
        server.push_updates(SuggestionsDatabaseUpdates {
            current_version: 2,
            updates: vec![],
        });
        assert_eq!(stream.next().await.map(|b| b.current_version), Some(1));
        assert_eq!(stream.next().await.map(|b| b.current_version), Some(2));

        server.disconnect();
        assert!(stream.next().await.is_none());
        assert!(matches!(
            server.get_suggestions_database().await,
            Err(ApiError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let server = InMemoryLanguageServer::new();
        server.fail_snapshot(1);
        assert!(server.get_suggestions_database().await.is_err());
        assert!(server.get_suggestions_database().await.is_ok());
        assert_eq!(server.snapshot_requests(), 2);
    }
}
