use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Payload of the `refactoring/projectRenamed` notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRenamed {
    pub namespace: String,
    pub old_normalized_name: String,
    pub new_normalized_name: String,
}

impl ProjectRenamed {
    pub fn old_project(&self) -> String {
        format!("{}.{}", self.namespace, self.old_normalized_name)
    }

    pub fn new_project(&self) -> String {
        format!("{}.{}", self.namespace, self.new_normalized_name)
    }
}
