//! Tags extracted from suggestion documentation.
//!
//! Tag lines look like `ALIAS Join, Concatenate` or `PRIVATE` and may appear
//! anywhere in the text, one per line. A flag followed by more words is prose,
//! so `PRIVATE fields are hidden` stays in the description.

use crate::model::{MAIN_MODULE, QualifiedName};
use once_cell::sync::Lazy;
use regex::Regex;
use semscope_api::LibraryComponentGroup;
use serde::Serialize;

static TAG_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Z][A-Z_]*)(?:\s+(.*?))?\s*$")
        .unwrap_or_else(|e| panic!("invalid tag regex: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocTagKind {
    Alias,
    Group,
    Icon,
    Private,
    Unstable,
    Advanced,
    Deprecated,
}

impl DocTagKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "ALIAS" => DocTagKind::Alias,
            "GROUP" => DocTagKind::Group,
            "ICON" => DocTagKind::Icon,
            "PRIVATE" => DocTagKind::Private,
            "UNSTABLE" => DocTagKind::Unstable,
            "ADVANCED" => DocTagKind::Advanced,
            "DEPRECATED" => DocTagKind::Deprecated,
            _ => return None,
        })
    }

    /// Flags stand alone on their line; valued tags carry a body.
    fn takes_body(self) -> bool {
        matches!(self, DocTagKind::Alias | DocTagKind::Group | DocTagKind::Icon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocTag {
    pub kind: DocTagKind,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
    pub description: String,
    pub tags: Vec<DocTag>,
    pub aliases: Vec<String>,
    /// Raw value of the `GROUP` tag.
    pub group: Option<String>,
    /// Position of `group` in the database's component groups.
    pub group_index: Option<usize>,
    pub icon_name: Option<String>,
    pub is_private: bool,
    pub is_unstable: bool,
    pub is_deprecated: bool,
}

impl Documentation {
    pub fn parse(raw: &str, groups: &[LibraryComponentGroup]) -> Self {
        let mut doc = Documentation::default();
        let mut description = Vec::new();

        for line in raw.lines() {
            let tag = TAG_LINE_RE.captures(line).and_then(|caps| {
                let kind = DocTagKind::from_keyword(caps.get(1)?.as_str())?;
                let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                if !kind.takes_body() && !body.is_empty() {
                    return None;
                }
                Some(DocTag {
                    kind,
                    body: body.to_string(),
                })
            });
            match tag {
                Some(tag) => doc.apply_tag(tag),
                None => description.push(line),
            }
        }

        doc.description = description.join("\n").trim().to_string();
        doc.resolve_group(groups);
        doc
    }

    fn apply_tag(&mut self, tag: DocTag) {
        match tag.kind {
            DocTagKind::Alias => self.aliases.extend(
                tag.body
                    .split(',')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .map(str::to_string),
            ),
            DocTagKind::Group => self.group = Some(tag.body.clone()),
            DocTagKind::Icon => self.icon_name = Some(tag.body.clone()),
            DocTagKind::Private => self.is_private = true,
            DocTagKind::Unstable | DocTagKind::Advanced => self.is_unstable = true,
            DocTagKind::Deprecated => self.is_deprecated = true,
        }
        self.tags.push(tag);
    }

    /// Recompute `group_index` against a (possibly new) group list.
    pub fn resolve_group(&mut self, groups: &[LibraryComponentGroup]) {
        self.group_index = self.group.as_deref().and_then(|group| {
            let wanted = normalize_group_name(group);
            groups
                .iter()
                .position(|g| normalize_group_name(&g.qualified_name()) == wanted)
        });
    }
}

/// `Standard.Base.Main.Input` and `Standard.Base.Input` name the same group.
fn normalize_group_name(name: &str) -> String {
    let Ok(qn) = QualifiedName::parse(name.trim()) else {
        return name.trim().to_string();
    };
    let segments: Vec<&str> = qn.segments().collect();
    if segments.len() > 3 && segments[2] == MAIN_MODULE {
        let mut kept = segments[..2].to_vec();
        kept.extend_from_slice(&segments[3..]);
        return kept.join(".");
    }
    qn.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(library: &str, name: &str) -> LibraryComponentGroup {
        LibraryComponentGroup {
            library: library.to_string(),
            name: name.to_string(),
            color: None,
            exports: vec![],
        }
    }

    #[test]
    fn test_tags_are_extracted() {
        let raw = "ALIAS Join, Concatenate\nGROUP Standard.Base.Calculations\nICON text\n\nJoins two texts.";
        let groups = vec![
            group("Standard.Base", "Input"),
            group("Standard.Base", "Calculations"),
        ];
        let doc = Documentation::parse(raw, &groups);

        assert_eq!(doc.aliases, vec!["Join", "Concatenate"]);
        assert_eq!(doc.group.as_deref(), Some("Standard.Base.Calculations"));
        assert_eq!(doc.group_index, Some(1));
        assert_eq!(doc.icon_name.as_deref(), Some("text"));
        assert_eq!(doc.description, "Joins two texts.");
        assert_eq!(doc.tags.len(), 3);
        assert!(!doc.is_private);
    }

    #[test]
    fn test_flags() {
        let doc = Documentation::parse("PRIVATE\nADVANCED\nDEPRECATED\nSome text", &[]);
        assert!(doc.is_private);
        assert!(doc.is_unstable);
        assert!(doc.is_deprecated);
        assert_eq!(doc.description, "Some text");
    }

    #[test]
    fn test_unknown_uppercase_words_stay_in_description() {
        let doc = Documentation::parse("NOTE this is not a tag\nA sentence.", &[]);
        assert!(doc.tags.is_empty());
        assert_eq!(doc.description, "NOTE this is not a tag\nA sentence.");
    }

    #[test]
    fn test_flag_keyword_starting_a_sentence_is_description() {
        let doc = Documentation::parse("PRIVATE fields are not shown.\nDEPRECATED since 2.0", &[]);
        assert!(!doc.is_private);
        assert!(!doc.is_deprecated);
        assert!(doc.tags.is_empty());
        assert_eq!(doc.description, "PRIVATE fields are not shown.\nDEPRECATED since 2.0");

        let doc = Documentation::parse("  PRIVATE  \nShown only to maintainers.", &[]);
        assert!(doc.is_private);
        assert_eq!(doc.description, "Shown only to maintainers.");
    }

    #[test]
    fn test_group_matching_ignores_main_and_tracks_group_changes() {
        let mut doc = Documentation::parse("GROUP Standard.Base.Main.Input", &[]);
        assert_eq!(doc.group_index, None);
        doc.resolve_group(&[group("Standard.Base", "Input")]);
        assert_eq!(doc.group_index, Some(0));
    }
}
