use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Server-assigned key of a suggestion, unique within one database.
pub type SuggestionId = u32;

/// Opaque id the engine assigns to an expression in the edited source.
pub type ExternalId = String;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Visibility window of a local binding or a local function.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
pub struct SuggestionEntryScope {
    pub start: Position,
    pub end: Position,
}

impl SuggestionEntryScope {
    pub fn contains(&self, position: Position) -> bool {
        (self.start.line, self.start.character) <= (position.line, position.character)
            && (position.line, position.character) <= (self.end.line, self.end.character)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEntryArgument {
    pub name: String,
    pub repr_type: String,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_values: Option<Vec<String>>,
}

/// A suggestion as the language server sends it. Names are raw qualified
/// strings; validation happens when the record is translated into an entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "type")]
pub enum SuggestionRecord {
    #[serde(rename = "module", rename_all = "camelCase")]
    Module {
        module: String,
        #[serde(default)]
        documentation: Option<String>,
        #[serde(default)]
        reexport: Option<String>,
    },
    #[serde(rename = "type", rename_all = "camelCase")]
    Type {
        module: String,
        name: String,
        #[serde(default)]
        params: Vec<SuggestionEntryArgument>,
        #[serde(default)]
        parent_type: Option<String>,
        #[serde(default)]
        return_type: Option<String>,
        #[serde(default)]
        reexport: Option<String>,
        #[serde(default)]
        documentation: Option<String>,
    },
    #[serde(rename = "constructor", rename_all = "camelCase")]
    Constructor {
        module: String,
        name: String,
        #[serde(default)]
        arguments: Vec<SuggestionEntryArgument>,
        return_type: String,
        #[serde(default)]
        annotations: Vec<String>,
        #[serde(default)]
        reexport: Option<String>,
        #[serde(default)]
        documentation: Option<String>,
    },
    #[serde(rename = "method", rename_all = "camelCase")]
    Method {
        module: String,
        name: String,
        #[serde(default)]
        arguments: Vec<SuggestionEntryArgument>,
        self_type: String,
        return_type: String,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        annotations: Vec<String>,
        #[serde(default)]
        reexport: Option<String>,
        #[serde(default)]
        documentation: Option<String>,
    },
    #[serde(rename = "function", rename_all = "camelCase")]
    Function {
        #[serde(default)]
        external_id: Option<ExternalId>,
        module: String,
        name: String,
        #[serde(default)]
        arguments: Vec<SuggestionEntryArgument>,
        return_type: String,
        #[serde(default)]
        scope: Option<SuggestionEntryScope>,
        #[serde(default)]
        documentation: Option<String>,
    },
    #[serde(rename = "local", rename_all = "camelCase")]
    Local {
        #[serde(default)]
        external_id: Option<ExternalId>,
        module: String,
        name: String,
        return_type: String,
        #[serde(default)]
        scope: Option<SuggestionEntryScope>,
        #[serde(default)]
        documentation: Option<String>,
    },
}

impl SuggestionRecord {
    /// The raw module name every record carries.
    pub fn module(&self) -> &str {
        match self {
            SuggestionRecord::Module { module, .. }
            | SuggestionRecord::Type { module, .. }
            | SuggestionRecord::Constructor { module, .. }
            | SuggestionRecord::Method { module, .. }
            | SuggestionRecord::Function { module, .. }
            | SuggestionRecord::Local { module, .. } => module,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct SuggestionsDatabaseEntry {
    pub id: SuggestionId,
    pub suggestion: SuggestionRecord,
}

/// Response of `search/getSuggestionsDatabase`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsDatabaseSnapshot {
    #[serde(default)]
    pub entries: Vec<SuggestionsDatabaseEntry>,
    pub current_version: u64,
}
