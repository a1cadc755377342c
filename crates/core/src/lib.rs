pub mod config;
pub mod error;
pub mod logging;

pub mod imports;
pub mod memory;
pub mod model;
pub mod project;
pub mod runtime;
pub mod store;
pub mod suggestion;

pub use config::{BackoffConfig, SessionConfig};
pub use error::{Result, SemscopeError, SuggestionError};
pub use memory::InMemoryLanguageServer;
pub use runtime::Session;
