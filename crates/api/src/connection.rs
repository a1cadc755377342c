use crate::error::ApiResult;
use crate::models::{
    ComponentGroups, ExpressionUpdate, ProjectRenamed, SuggestionsDatabaseSnapshot,
    SuggestionsDatabaseUpdates,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Capability that enables `search/suggestionsDatabaseUpdates` notifications.
pub const RECEIVES_SUGGESTIONS_DATABASE_UPDATES: &str = "search/receivesSuggestionsDatabaseUpdates";

// ============================================================================
// Language server connection
// ============================================================================

/// The language-server side of a project session.
///
/// Requests are fallible and may be retried by the caller. Notification
/// streams deliver items in the order the server sent them; a stream ends
/// when the connection is disposed.
#[async_trait]
pub trait LanguageServer: Send + Sync {
    /// Ask the server to start pushing a category of notifications.
    async fn acquire_capability(&self, method: &str, params: serde_json::Value) -> ApiResult<()>;

    /// Fetch the full suggestion database together with its version.
    async fn get_suggestions_database(&self) -> ApiResult<SuggestionsDatabaseSnapshot>;

    /// Fetch the component groups published by loaded libraries.
    async fn get_component_groups(&self) -> ApiResult<ComponentGroups>;

    /// Subscribe to `search/suggestionsDatabaseUpdates`.
    fn suggestion_updates(&self) -> BoxStream<'static, SuggestionsDatabaseUpdates>;

    /// Subscribe to `executionContext/expressionUpdates`.
    fn expression_updates(&self) -> BoxStream<'static, Vec<ExpressionUpdate>>;

    /// Subscribe to `refactoring/projectRenamed`.
    fn project_renamed(&self) -> BoxStream<'static, ProjectRenamed>;
}
