//! Translation of language-server suggestion records and `Modify` updates
//! into [`SuggestionEntry`] values.

use super::documentation::Documentation;
use super::entry::{EntryKind, SuggestionEntry, TypeRef};
use crate::error::SuggestionError;
use crate::model::{Identifier, ProjectPath};
use crate::project::PathResolver;
use semscope_api::{
    FieldUpdate, LibraryComponentGroup, SuggestionArgumentUpdate, SuggestionModification,
    SuggestionRecord,
};

type Result<T> = std::result::Result<T, SuggestionError>;

fn parse_path(field: &'static str, raw: &str, resolver: &PathResolver) -> Result<ProjectPath> {
    resolver
        .parse_project_path_str(raw)
        .map(|path| path.normalized())
        .map_err(|e| SuggestionError::InvalidName {
            field,
            reason: e.to_string(),
        })
}

fn parse_opt_path(
    field: &'static str,
    raw: Option<&String>,
    resolver: &PathResolver,
) -> Result<Option<ProjectPath>> {
    raw.map(|raw| parse_path(field, raw, resolver)).transpose()
}

fn parse_identifier(field: &'static str, raw: &str) -> Result<Identifier> {
    Identifier::parse(raw).map_err(|e| SuggestionError::InvalidName {
        field,
        reason: e.to_string(),
    })
}

fn documentation(raw: Option<&String>, groups: &[LibraryComponentGroup]) -> Documentation {
    raw.map(|doc| Documentation::parse(doc, groups))
        .unwrap_or_default()
}

/// Name of a module entry: the last segment of its printed path, so the main
/// module of a project is named after the project.
fn module_name(path: &ProjectPath, resolver: &PathResolver) -> Identifier {
    resolver.print_project_path(path).last_identifier()
}

pub fn entry_from_record(
    record: &SuggestionRecord,
    resolver: &PathResolver,
    groups: &[LibraryComponentGroup],
) -> Result<SuggestionEntry> {
    let defined_in = parse_path("module", record.module(), resolver)?;

    let entry = match record {
        SuggestionRecord::Module {
            documentation: doc,
            reexport,
            ..
        } => SuggestionEntry {
            name: module_name(&defined_in, resolver),
            return_type: TypeRef::Path(defined_in.clone()),
            kind: EntryKind::Module {
                reexported_in: parse_opt_path("reexport", reexport.as_ref(), resolver)?,
            },
            documentation: documentation(doc.as_ref(), groups),
            defined_in,
        },
        SuggestionRecord::Type {
            name,
            params,
            parent_type,
            return_type,
            reexport,
            documentation: doc,
            ..
        } => {
            let name = parse_identifier("name", name)?;
            let return_type = match return_type {
                Some(raw) => TypeRef::parse(raw, resolver),
                None => TypeRef::Path(defined_in.append(&name)),
            };
            SuggestionEntry {
                name,
                return_type,
                kind: EntryKind::Type {
                    params: params.clone(),
                    parent_type: parse_opt_path("parentType", parent_type.as_ref(), resolver)?,
                    reexported_in: parse_opt_path("reexport", reexport.as_ref(), resolver)?,
                },
                documentation: documentation(doc.as_ref(), groups),
                defined_in,
            }
        }
        SuggestionRecord::Constructor {
            name,
            arguments,
            return_type,
            annotations,
            reexport,
            documentation: doc,
            ..
        } => SuggestionEntry {
            name: parse_identifier("name", name)?,
            return_type: TypeRef::parse(return_type, resolver),
            kind: EntryKind::Constructor {
                member_of: parse_path("returnType", return_type, resolver)?,
                arguments: arguments.clone(),
                annotations: annotations.clone(),
                reexported_in: parse_opt_path("reexport", reexport.as_ref(), resolver)?,
            },
            documentation: documentation(doc.as_ref(), groups),
            defined_in,
        },
        SuggestionRecord::Method {
            name,
            arguments,
            self_type,
            return_type,
            is_static,
            annotations,
            reexport,
            documentation: doc,
            ..
        } => {
            let member_of = parse_path("selfType", self_type, resolver)?;
            SuggestionEntry {
                name: parse_identifier("name", name)?,
                return_type: TypeRef::parse(return_type, resolver),
                kind: EntryKind::Method {
                    self_type: (!is_static).then(|| member_of.clone()),
                    member_of,
                    is_static: *is_static,
                    arguments: arguments.clone(),
                    annotations: annotations.clone(),
                    reexported_in: parse_opt_path("reexport", reexport.as_ref(), resolver)?,
                },
                documentation: documentation(doc.as_ref(), groups),
                defined_in,
            }
        }
        SuggestionRecord::Function {
            external_id,
            name,
            arguments,
            return_type,
            scope,
            documentation: doc,
            ..
        } => SuggestionEntry {
            name: parse_identifier("name", name)?,
            return_type: TypeRef::parse(return_type, resolver),
            kind: EntryKind::Function {
                arguments: arguments.clone(),
                scope: *scope,
                external_id: external_id.clone(),
            },
            documentation: documentation(doc.as_ref(), groups),
            defined_in,
        },
        SuggestionRecord::Local {
            external_id,
            name,
            return_type,
            scope,
            documentation: doc,
            ..
        } => SuggestionEntry {
            name: parse_identifier("name", name)?,
            return_type: TypeRef::parse(return_type, resolver),
            kind: EntryKind::Local {
                scope: *scope,
                external_id: external_id.clone(),
            },
            documentation: documentation(doc.as_ref(), groups),
            defined_in,
        },
    };
    Ok(entry)
}

/// Apply the field changes of a `Modify` update.
///
/// On error the entry may be partially modified; callers apply this to a copy.
pub fn apply_modification(
    entry: &mut SuggestionEntry,
    modification: &SuggestionModification,
    resolver: &PathResolver,
    groups: &[LibraryComponentGroup],
) -> Result<()> {
    let kind = entry.suggestion_kind().as_str();

    for update in &modification.arguments {
        let arguments = entry
            .arguments_mut()
            .ok_or(SuggestionError::UnsupportedField {
                field: "arguments",
                kind,
            })?;
        apply_argument_update(arguments, update)?;
    }

    if let Some(update) = &modification.module {
        let raw = update
            .clone()
            .into_value()
            .ok_or(SuggestionError::MissingField("module"))?;
        entry.defined_in = parse_path("module", &raw, resolver)?;
    }

    if let Some(update) = &modification.self_type {
        let raw = update
            .clone()
            .into_value()
            .ok_or(SuggestionError::MissingField("selfType"))?;
        let path = parse_path("selfType", &raw, resolver)?;
        match &mut entry.kind {
            EntryKind::Method {
                member_of,
                self_type,
                is_static,
                ..
            } => {
                if !*is_static {
                    *self_type = Some(path.clone());
                }
                *member_of = path;
            }
            EntryKind::Constructor { member_of, .. } => *member_of = path,
            _ => {
                return Err(SuggestionError::UnsupportedField {
                    field: "selfType",
                    kind,
                });
            }
        }
    }

    if let Some(update) = &modification.return_type {
        entry.return_type = match update {
            FieldUpdate::Set { value } => TypeRef::parse(value, resolver),
            FieldUpdate::Remove => TypeRef::Unknown,
        };
    }

    if let Some(update) = &modification.documentation {
        entry.documentation = match update {
            FieldUpdate::Set { value } => Documentation::parse(value, groups),
            FieldUpdate::Remove => Documentation::default(),
        };
    }

    if let Some(update) = &modification.scope {
        match &mut entry.kind {
            EntryKind::Function { scope, .. } | EntryKind::Local { scope, .. } => {
                *scope = update.clone().into_value();
            }
            _ => return Err(SuggestionError::UnsupportedField { field: "scope", kind }),
        }
    }

    if let Some(update) = &modification.external_id {
        match &mut entry.kind {
            EntryKind::Function { external_id, .. } | EntryKind::Local { external_id, .. } => {
                *external_id = update.clone().into_value();
            }
            // Other kinds have no expression in the edited module.
            _ => tracing::trace!("Ignoring externalId update for {} entry", kind),
        }
    }

    if let Some(update) = &modification.reexport {
        let value = update
            .clone()
            .into_value()
            .map(|raw| parse_path("reexport", &raw, resolver))
            .transpose()?;
        match &mut entry.kind {
            EntryKind::Module { reexported_in }
            | EntryKind::Type { reexported_in, .. }
            | EntryKind::Constructor { reexported_in, .. }
            | EntryKind::Method { reexported_in, .. } => *reexported_in = value,
            _ => {
                return Err(SuggestionError::UnsupportedField {
                    field: "reexport",
                    kind,
                });
            }
        }
    }

    Ok(())
}

fn apply_argument_update(
    arguments: &mut Vec<semscope_api::SuggestionEntryArgument>,
    update: &SuggestionArgumentUpdate,
) -> Result<()> {
    let len = arguments.len();
    match update {
        SuggestionArgumentUpdate::Add { index, argument } => {
            if *index > len {
                return Err(SuggestionError::InvalidArgumentIndex { index: *index, len });
            }
            arguments.insert(*index, argument.clone());
        }
        SuggestionArgumentUpdate::Remove { index } => {
            if *index >= len {
                return Err(SuggestionError::InvalidArgumentIndex { index: *index, len });
            }
            arguments.remove(*index);
        }
        SuggestionArgumentUpdate::Modify {
            index,
            name,
            repr_type,
            is_suspended,
            has_default,
            default_value,
        } => {
            let argument = arguments
                .get_mut(*index)
                .ok_or(SuggestionError::InvalidArgumentIndex { index: *index, len })?;
            if let Some(update) = name {
                argument.name = update
                    .clone()
                    .into_value()
                    .ok_or(SuggestionError::MissingField("name"))?;
            }
            if let Some(update) = repr_type {
                argument.repr_type = update
                    .clone()
                    .into_value()
                    .ok_or(SuggestionError::MissingField("reprType"))?;
            }
            if let Some(update) = is_suspended {
                argument.is_suspended = update.clone().into_value().unwrap_or(false);
            }
            if let Some(update) = has_default {
                argument.has_default = update.clone().into_value().unwrap_or(false);
            }
            if let Some(update) = default_value {
                argument.default_value = update.clone().into_value();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semscope_api::SuggestionEntryArgument;

    use crate::model::QualifiedName;

    fn resolver() -> PathResolver {
        PathResolver::new(QualifiedName::parse("local.Project").unwrap()).unwrap()
    }

    fn arg(name: &str) -> SuggestionEntryArgument {
        SuggestionEntryArgument {
            name: name.to_string(),
            repr_type: "Standard.Base.Any.Any".to_string(),
            is_suspended: false,
            has_default: false,
            default_value: None,
            tag_values: None,
        }
    }

    fn method_record() -> SuggestionRecord {
        SuggestionRecord::Method {
            module: "local.Project.Main".to_string(),
            name: "foo".to_string(),
            arguments: vec![arg("self"), arg("x")],
            self_type: "local.Project.Main".to_string(),
            return_type: "Standard.Base.Data.Numbers.Integer".to_string(),
            is_static: true,
            annotations: vec![],
            reexport: None,
            documentation: Some("ALIAS bar".to_string()),
        }
    }

    #[test]
    fn test_method_record_is_normalized() {
        let r = resolver();
        let entry = entry_from_record(&method_record(), &r, &[]).unwrap();
        assert_eq!(entry.defined_in, ProjectPath::local(None));
        assert_eq!(entry.member_of(), Some(&ProjectPath::local(None)));
        assert_eq!(
            entry.definition_path(),
            ProjectPath::local(Some(QualifiedName::parse("foo").unwrap()))
        );
        assert_eq!(entry.self_type(), None);
        assert_eq!(entry.documentation.aliases, vec!["bar"]);
    }

    #[test]
    fn test_main_module_is_named_after_project() {
        let r = resolver();
        let record = SuggestionRecord::Module {
            module: "local.Project.Main".to_string(),
            documentation: None,
            reexport: None,
        };
        let entry = entry_from_record(&record, &r, &[]).unwrap();
        assert_eq!(entry.name.as_str(), "Project");
        assert!(entry.defined_in.is_project_root());
    }

    #[test]
    fn test_malformed_record_is_rejected() {
        let r = resolver();
        let record = SuggestionRecord::Type {
            module: "Standard".to_string(),
            name: "Vector".to_string(),
            params: vec![],
            parent_type: None,
            return_type: None,
            reexport: None,
            documentation: None,
        };
        assert!(matches!(
            entry_from_record(&record, &r, &[]),
            Err(SuggestionError::InvalidName { field: "module", .. })
        ));

        let record = SuggestionRecord::Local {
            external_id: None,
            module: "local.Project.Main".to_string(),
            name: "not valid".to_string(),
            return_type: String::new(),
            scope: None,
            documentation: None,
        };
        assert!(entry_from_record(&record, &r, &[]).is_err());
    }

    #[test]
    fn test_modification_updates_fields_and_arguments() {
        let r = resolver();
        let mut entry = entry_from_record(&method_record(), &r, &[]).unwrap();
        let modification = SuggestionModification {
            arguments: vec![
                SuggestionArgumentUpdate::Remove { index: 1 },
                SuggestionArgumentUpdate::Add {
                    index: 1,
                    argument: arg("y"),
                },
                SuggestionArgumentUpdate::Modify {
                    index: 1,
                    name: None,
                    repr_type: Some(FieldUpdate::set("Standard.Base.Data.Text.Text".to_string())),
                    is_suspended: Some(FieldUpdate::set(true)),
                    has_default: None,
                    default_value: None,
                },
            ],
            return_type: Some(FieldUpdate::Remove),
            documentation: Some(FieldUpdate::set("PRIVATE".to_string())),
            reexport: Some(FieldUpdate::set("local.Project.Other".to_string())),
            ..Default::default()
        };
        apply_modification(&mut entry, &modification, &r, &[]).unwrap();

        let args = entry.arguments().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].name, "y");
        assert_eq!(args[1].repr_type, "Standard.Base.Data.Text.Text");
        assert!(args[1].is_suspended);
        assert_eq!(entry.return_type, TypeRef::Unknown);
        assert!(entry.documentation.is_private);
        assert_eq!(
            entry.reexported_in(),
            Some(&ProjectPath::local(Some(QualifiedName::parse("Other").unwrap())))
        );
    }

    #[test]
    fn test_invalid_modifications_are_errors() {
        let r = resolver();
        let mut entry = entry_from_record(&method_record(), &r, &[]).unwrap();

        let out_of_range = SuggestionModification {
            arguments: vec![SuggestionArgumentUpdate::Remove { index: 5 }],
            ..Default::default()
        };
        assert_eq!(
            apply_modification(&mut entry, &out_of_range, &r, &[]),
            Err(SuggestionError::InvalidArgumentIndex { index: 5, len: 2 })
        );

        let scope_on_method = SuggestionModification {
            scope: Some(FieldUpdate::Remove),
            ..Default::default()
        };
        assert!(matches!(
            apply_modification(&mut entry, &scope_on_method, &r, &[]),
            Err(SuggestionError::UnsupportedField { field: "scope", .. })
        ));

        let remove_module = SuggestionModification {
            module: Some(FieldUpdate::Remove),
            ..Default::default()
        };
        assert_eq!(
            apply_modification(&mut entry, &remove_module, &r, &[]),
            Err(SuggestionError::MissingField("module"))
        );
    }
}
