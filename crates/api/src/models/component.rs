use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named group of components published by a library.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct LibraryComponentGroup {
    /// Qualified name of the library, e.g. `Standard.Base`.
    pub library: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

impl LibraryComponentGroup {
    /// The name documentation tags use to refer to this group.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.library, self.name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentGroups {
    #[serde(default)]
    pub component_groups: Vec<LibraryComponentGroup>,
}
