//! The suggestion database: entries, their indices and translation from the
//! language server's wire records.

pub mod db;
pub mod documentation;
pub mod entry;
pub mod translate;

pub use db::{Ancestors, SharedSuggestionDb, SuggestionDb, SuggestionIndices};
pub use documentation::{DocTag, DocTagKind, Documentation};
pub use entry::{
    EntryKind, MethodPointer, Scope, SuggestionArgument, SuggestionEntry, SuggestionId,
    SuggestionKind, TypeRef, display_path, is_callable, is_static, is_visible_at, method_pointer,
};
