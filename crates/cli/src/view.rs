use semscope_core::project::PathResolver;
use semscope_core::suggestion::{SuggestionEntry, SuggestionId, display_path};
use tabled::Tabled;

/// One row per suggestion entry
#[derive(Tabled)]
pub struct EntryView {
    #[tabled(rename = "Id")]
    pub id: SuggestionId,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Defined In")]
    pub location: String,
    #[tabled(rename = "Returns")]
    pub return_type: String,
    #[tabled(rename = "Group")]
    pub group: String,
}

impl EntryView {
    pub fn from_entry(id: SuggestionId, entry: &SuggestionEntry, resolver: &PathResolver) -> Self {
        let mut name = entry.name.to_string();
        if entry.documentation.is_deprecated {
            name.push_str(" (deprecated)");
        }
        Self {
            id,
            kind: entry.suggestion_kind().to_string(),
            name,
            location: display_path(entry, resolver).to_string(),
            return_type: entry
                .return_type
                .print(resolver)
                .unwrap_or_else(|| "-".to_string()),
            group: entry
                .documentation
                .group
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
