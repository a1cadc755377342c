pub mod project_path;
pub mod qualified_name;

pub use project_path::{MAIN_MODULE, ProjectPath};
pub use qualified_name::{Identifier, QualifiedName};
