//! Import analysis: which imports an entry needs, whether existing import
//! statements already cover them, and inserting the missing ones.

pub mod analysis;
pub mod module;
pub mod syntax;

pub use analysis::{
    ImportConflict, covers, detect_import_conflicts, missing_imports, required_imports,
};
pub use module::{EditableModule, SourceModule, add_imports, recognize_imports};
pub use syntax::{Import, ImportedNames, RequiredImport, is_import_statement, recognize_import};
