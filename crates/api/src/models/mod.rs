pub mod component;
pub mod expression;
pub mod project;
pub mod suggestion;
pub mod update;

pub use component::*;
pub use expression::*;
pub use project::*;
pub use suggestion::*;
pub use update::*;
