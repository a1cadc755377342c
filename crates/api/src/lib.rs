pub mod connection;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use connection::{LanguageServer, RECEIVES_SUGGESTIONS_DATABASE_UPDATES};
pub use error::{ApiError, ApiResult};
pub use models::*;
