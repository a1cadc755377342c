use super::suggestion::{
    ExternalId, SuggestionEntryArgument, SuggestionEntryScope, SuggestionId, SuggestionRecord,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Change of a single optional field: either a new value or its removal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "tag")]
pub enum FieldUpdate<T> {
    Set { value: T },
    Remove,
}

impl<T> FieldUpdate<T> {
    pub fn set(value: T) -> Self {
        FieldUpdate::Set { value }
    }

    /// The new value, `None` when the field is removed.
    pub fn into_value(self) -> Option<T> {
        match self {
            FieldUpdate::Set { value } => Some(value),
            FieldUpdate::Remove => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type")]
pub enum SuggestionArgumentUpdate {
    Add {
        index: usize,
        argument: SuggestionEntryArgument,
    },
    Remove {
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Modify {
        index: usize,
        #[serde(default)]
        name: Option<FieldUpdate<String>>,
        #[serde(default)]
        repr_type: Option<FieldUpdate<String>>,
        #[serde(default)]
        is_suspended: Option<FieldUpdate<bool>>,
        #[serde(default)]
        has_default: Option<FieldUpdate<bool>>,
        #[serde(default)]
        default_value: Option<FieldUpdate<String>>,
    },
}

/// Field-level changes carried by a `Modify` update. Absent fields are left
/// untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionModification {
    #[serde(default)]
    pub external_id: Option<FieldUpdate<ExternalId>>,
    #[serde(default)]
    pub arguments: Vec<SuggestionArgumentUpdate>,
    #[serde(default)]
    pub module: Option<FieldUpdate<String>>,
    #[serde(default)]
    pub self_type: Option<FieldUpdate<String>>,
    #[serde(default)]
    pub return_type: Option<FieldUpdate<String>>,
    #[serde(default)]
    pub documentation: Option<FieldUpdate<String>>,
    #[serde(default)]
    pub scope: Option<FieldUpdate<SuggestionEntryScope>>,
    #[serde(default)]
    pub reexport: Option<FieldUpdate<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "type")]
pub enum SuggestionsDatabaseUpdate {
    Add {
        id: SuggestionId,
        suggestion: SuggestionRecord,
    },
    Remove {
        id: SuggestionId,
    },
    Modify {
        id: SuggestionId,
        #[serde(flatten)]
        modification: SuggestionModification,
    },
}

impl SuggestionsDatabaseUpdate {
    pub fn id(&self) -> SuggestionId {
        match self {
            SuggestionsDatabaseUpdate::Add { id, .. }
            | SuggestionsDatabaseUpdate::Remove { id }
            | SuggestionsDatabaseUpdate::Modify { id, .. } => *id,
        }
    }
}

/// Payload of the `search/suggestionsDatabaseUpdates` notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsDatabaseUpdates {
    pub current_version: u64,
    #[serde(default)]
    pub updates: Vec<SuggestionsDatabaseUpdate>,
}
