use super::syntax::{Import, ImportedNames, RequiredImport};
use crate::model::{Identifier, ProjectPath, QualifiedName};
use crate::project::PathResolver;
use crate::suggestion::{EntryKind, SuggestionDb, SuggestionEntry};
use serde::Serialize;

/// An unqualified import that would shadow a name already in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportConflict {
    pub name: Identifier,
    /// Full name of the entity being imported.
    pub fully_qualified: QualifiedName,
}

fn names_include(names: &[Identifier], name: &str) -> bool {
    names.iter().any(|n| n.as_str() == name)
}

/// Whether `import` brings the segment `name` of module `from` into scope.
fn exposes(import: &Import, from: &QualifiedName, name: &str) -> bool {
    if &import.from != from {
        return false;
    }
    match &import.imported {
        ImportedNames::List { names } => names_include(names, name),
        ImportedNames::All { except } => !names_include(except, name),
        ImportedNames::Module { .. } => false,
    }
}

/// Whether the existing import statement already makes `required` visible.
pub fn covers(existing: &Import, required: &RequiredImport) -> bool {
    match required {
        RequiredImport::Qualified { module } => {
            if let ImportedNames::Module { .. } = existing.imported {
                return &existing.from == module;
            }
            // `from A import B` (or `all`) reaches `A.B.C...` through `B`.
            if !module.starts_with(&existing.from) || &existing.from == module {
                return false;
            }
            let depth = existing.from.segment_count();
            module
                .segments()
                .nth(depth)
                .is_some_and(|next| exposes(existing, &existing.from, next))
        }
        RequiredImport::Unqualified { from, import } => exposes(existing, from, import.as_str()),
    }
}

/// The subset of `required` not covered by any of `existing`.
pub fn missing_imports(existing: &[Import], required: &[RequiredImport]) -> Vec<RequiredImport> {
    required
        .iter()
        .filter(|r| !existing.iter().any(|e| covers(e, r)))
        .cloned()
        .collect()
}

/// Imports needed to reference `entry` by its short name.
pub fn required_imports(
    db: &SuggestionDb,
    resolver: &PathResolver,
    entry: &SuggestionEntry,
) -> Vec<RequiredImport> {
    let mut imports = entry_imports(db, resolver, entry);
    let mut seen = std::collections::HashSet::new();
    imports.retain(|import| seen.insert(import.clone()));
    imports
}

fn entry_imports(
    db: &SuggestionDb,
    resolver: &PathResolver,
    entry: &SuggestionEntry,
) -> Vec<RequiredImport> {
    let print = |path: &ProjectPath| resolver.print_project_path(path);
    match &entry.kind {
        EntryKind::Module {
            reexported_in: Some(reexport),
        } => vec![RequiredImport::Unqualified {
            from: print(reexport),
            import: entry.name.clone(),
        }],
        EntryKind::Module { reexported_in: None } => vec![RequiredImport::Qualified {
            module: print(&entry.defined_in),
        }],
        EntryKind::Type { reexported_in, .. } => vec![RequiredImport::Unqualified {
            from: print(reexported_in.as_ref().unwrap_or(&entry.defined_in)),
            import: entry.name.clone(),
        }],
        EntryKind::Constructor { member_of, .. } => owner_imports(db, resolver, member_of),
        EntryKind::Method {
            member_of,
            is_static,
            ..
        } => {
            let mut imports = if *is_static {
                owner_imports(db, resolver, member_of)
            } else {
                Vec::new()
            };
            if is_extension(entry, member_of) {
                imports.extend(module_imports(db, resolver, &entry.defined_in));
            }
            imports
        }
        EntryKind::Function { .. } | EntryKind::Local { .. } => Vec::new(),
    }
}

/// A method defined outside the module of the type it extends. It only
/// resolves while its defining module is imported.
fn is_extension(entry: &SuggestionEntry, member_of: &ProjectPath) -> bool {
    let defined_in = entry.defined_in.normalized();
    let owner = member_of.normalized();
    owner != defined_in && owner.parent().is_none_or(|module| module != defined_in)
}

/// Imports of the type or module a member belongs to.
fn owner_imports(
    db: &SuggestionDb,
    resolver: &PathResolver,
    owner: &ProjectPath,
) -> Vec<RequiredImport> {
    match db.get_entry_by_project_path(owner) {
        Some(entry) if matches!(entry.kind, EntryKind::Type { .. } | EntryKind::Module { .. }) => {
            entry_imports(db, resolver, entry)
        }
        _ => {
            let name = resolver.print_project_path(owner);
            match name.split_last() {
                (Some(from), import) => vec![RequiredImport::Unqualified { from, import }],
                (None, _) => vec![RequiredImport::Qualified { module: name }],
            }
        }
    }
}

fn module_imports(
    db: &SuggestionDb,
    resolver: &PathResolver,
    module: &ProjectPath,
) -> Vec<RequiredImport> {
    match db.get_entry_by_project_path(module) {
        Some(entry) if matches!(entry.kind, EntryKind::Module { .. }) => {
            entry_imports(db, resolver, entry)
        }
        _ => vec![RequiredImport::Qualified {
            module: resolver.print_project_path(module),
        }],
    }
}

/// Check whether adding `importing` would shadow another entity of the same
/// name that `existing` already brings into scope.
pub fn detect_import_conflicts(
    db: &SuggestionDb,
    resolver: &PathResolver,
    existing: &[Import],
    importing: &RequiredImport,
) -> Option<ImportConflict> {
    let RequiredImport::Unqualified { from, import } = importing else {
        return None;
    };

    for id in db.find_by_name(import) {
        let Some(entry) = db.get(id) else { continue };
        let required = required_imports(db, resolver, entry);
        if required.is_empty() || required.contains(importing) {
            continue;
        }
        if required.iter().all(|r| existing.iter().any(|e| covers(e, r))) {
            tracing::debug!(
                "Importing {} from {} conflicts with entry {}",
                import,
                from,
                id
            );
            return Some(ImportConflict {
                name: import.clone(),
                fully_qualified: from.append(import),
            });
        }
    }
    None
}
