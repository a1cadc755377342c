use super::documentation::Documentation;
use crate::error::Result;
use crate::model::{Identifier, ProjectPath, QualifiedName};
use crate::project::PathResolver;
use semscope_api::{ExternalId, Position, SuggestionEntryArgument, SuggestionEntryScope};
use serde::Serialize;
use std::fmt;

pub use semscope_api::SuggestionId;

pub type SuggestionArgument = SuggestionEntryArgument;
pub type Scope = SuggestionEntryScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SuggestionKind {
    Module,
    Type,
    Constructor,
    Method,
    Function,
    Local,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Module => "module",
            SuggestionKind::Type => "type",
            SuggestionKind::Constructor => "constructor",
            SuggestionKind::Method => "method",
            SuggestionKind::Function => "function",
            SuggestionKind::Local => "local",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type reference that prints relative to the current project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A plain qualified type name.
    Path(ProjectPath),
    /// Anything else the server sent (applications, unions, ...), kept verbatim.
    Raw(String),
    Unknown,
}

impl TypeRef {
    pub fn parse(raw: &str, resolver: &PathResolver) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return TypeRef::Unknown;
        }
        match resolver.parse_project_path_str(raw) {
            Ok(path) => TypeRef::Path(path.normalized()),
            Err(_) => TypeRef::Raw(raw.to_string()),
        }
    }

    /// Printable form using the resolver's current project name.
    pub fn print(&self, resolver: &PathResolver) -> Option<String> {
        match self {
            TypeRef::Path(path) => Some(resolver.print_project_path(path).to_string()),
            TypeRef::Raw(raw) => Some(raw.clone()),
            TypeRef::Unknown => None,
        }
    }
}

/// Kind-specific part of a [`SuggestionEntry`]. Each variant carries only the
/// fields that make sense for it.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Module {
        reexported_in: Option<ProjectPath>,
    },
    Type {
        params: Vec<SuggestionArgument>,
        parent_type: Option<ProjectPath>,
        reexported_in: Option<ProjectPath>,
    },
    Constructor {
        member_of: ProjectPath,
        arguments: Vec<SuggestionArgument>,
        annotations: Vec<String>,
        reexported_in: Option<ProjectPath>,
    },
    Method {
        member_of: ProjectPath,
        /// `None` for static methods.
        self_type: Option<ProjectPath>,
        is_static: bool,
        arguments: Vec<SuggestionArgument>,
        annotations: Vec<String>,
        reexported_in: Option<ProjectPath>,
    },
    Function {
        arguments: Vec<SuggestionArgument>,
        scope: Option<Scope>,
        external_id: Option<ExternalId>,
    },
    Local {
        scope: Option<Scope>,
        external_id: Option<ExternalId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionEntry {
    /// The module the entry is defined in.
    pub defined_in: ProjectPath,
    pub name: Identifier,
    pub documentation: Documentation,
    pub return_type: TypeRef,
    pub kind: EntryKind,
}

impl SuggestionEntry {
    pub fn suggestion_kind(&self) -> SuggestionKind {
        match self.kind {
            EntryKind::Module { .. } => SuggestionKind::Module,
            EntryKind::Type { .. } => SuggestionKind::Type,
            EntryKind::Constructor { .. } => SuggestionKind::Constructor,
            EntryKind::Method { .. } => SuggestionKind::Method,
            EntryKind::Function { .. } => SuggestionKind::Function,
            EntryKind::Local { .. } => SuggestionKind::Local,
        }
    }

    /// Canonical path of the entry, ignoring re-exports.
    pub fn definition_path(&self) -> ProjectPath {
        match &self.kind {
            EntryKind::Module { .. } => self.defined_in.clone(),
            EntryKind::Constructor { member_of, .. } | EntryKind::Method { member_of, .. } => {
                member_of.append(&self.name)
            }
            EntryKind::Type { .. } | EntryKind::Function { .. } | EntryKind::Local { .. } => {
                self.defined_in.append(&self.name)
            }
        }
    }

    pub fn reexported_in(&self) -> Option<&ProjectPath> {
        match &self.kind {
            EntryKind::Module { reexported_in }
            | EntryKind::Type { reexported_in, .. }
            | EntryKind::Constructor { reexported_in, .. }
            | EntryKind::Method { reexported_in, .. } => reexported_in.as_ref(),
            EntryKind::Function { .. } | EntryKind::Local { .. } => None,
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        match &self.kind {
            EntryKind::Function { scope, .. } | EntryKind::Local { scope, .. } => scope.as_ref(),
            _ => None,
        }
    }

    pub fn external_id(&self) -> Option<&ExternalId> {
        match &self.kind {
            EntryKind::Function { external_id, .. } | EntryKind::Local { external_id, .. } => {
                external_id.as_ref()
            }
            _ => None,
        }
    }

    pub fn annotations(&self) -> Option<&[String]> {
        match &self.kind {
            EntryKind::Constructor { annotations, .. } | EntryKind::Method { annotations, .. } => {
                Some(annotations)
            }
            _ => None,
        }
    }

    /// Arguments of callables, or the parameters of a type.
    pub fn arguments(&self) -> Option<&[SuggestionArgument]> {
        match &self.kind {
            EntryKind::Type { params, .. } => Some(params),
            EntryKind::Constructor { arguments, .. }
            | EntryKind::Method { arguments, .. }
            | EntryKind::Function { arguments, .. } => Some(arguments),
            EntryKind::Module { .. } | EntryKind::Local { .. } => None,
        }
    }

    pub(crate) fn arguments_mut(&mut self) -> Option<&mut Vec<SuggestionArgument>> {
        match &mut self.kind {
            EntryKind::Type { params, .. } => Some(params),
            EntryKind::Constructor { arguments, .. }
            | EntryKind::Method { arguments, .. }
            | EntryKind::Function { arguments, .. } => Some(arguments),
            EntryKind::Module { .. } | EntryKind::Local { .. } => None,
        }
    }

    /// Owning type (or module, for module-level methods).
    pub fn member_of(&self) -> Option<&ProjectPath> {
        match &self.kind {
            EntryKind::Constructor { member_of, .. } | EntryKind::Method { member_of, .. } => {
                Some(member_of)
            }
            _ => None,
        }
    }

    pub fn self_type(&self) -> Option<&ProjectPath> {
        match &self.kind {
            EntryKind::Method { self_type, .. } => self_type.as_ref(),
            _ => None,
        }
    }

    pub fn parent_type(&self) -> Option<&ProjectPath> {
        match &self.kind {
            EntryKind::Type { parent_type, .. } => parent_type.as_ref(),
            _ => None,
        }
    }

    /// Printable return type relative to the current project name.
    pub fn return_type(&self, resolver: &PathResolver) -> Option<String> {
        self.return_type.print(resolver)
    }
}

/// A method identified by its module, defining type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodPointer {
    pub module: ProjectPath,
    pub defined_on_type: ProjectPath,
    pub name: Identifier,
}

impl MethodPointer {
    pub fn from_wire(ptr: &semscope_api::MethodPointer, resolver: &PathResolver) -> Result<Self> {
        Ok(Self {
            module: resolver.parse_project_path_str(&ptr.module)?.normalized(),
            defined_on_type: resolver
                .parse_project_path_str(&ptr.defined_on_type)?
                .normalized(),
            name: Identifier::parse(&ptr.name)?,
        })
    }

    /// The path of the method itself.
    pub fn member_path(&self) -> ProjectPath {
        self.defined_on_type.append(&self.name)
    }
}

// ---- Shared helpers over all entry kinds ----

pub fn is_static(entry: &SuggestionEntry) -> bool {
    match &entry.kind {
        EntryKind::Method { is_static, .. } => *is_static,
        EntryKind::Constructor { .. } => true,
        _ => false,
    }
}

pub fn is_callable(entry: &SuggestionEntry) -> bool {
    matches!(
        entry.kind,
        EntryKind::Method { .. } | EntryKind::Constructor { .. } | EntryKind::Function { .. }
    )
}

pub fn method_pointer(entry: &SuggestionEntry) -> Option<MethodPointer> {
    match &entry.kind {
        EntryKind::Method { member_of, .. } => Some(MethodPointer {
            module: entry.defined_in.clone(),
            defined_on_type: member_of.clone(),
            name: entry.name.clone(),
        }),
        _ => None,
    }
}

/// Where the entry lives, as shown next to its name (`Standard.Base.Data.Vector`
/// for `Vector.new`).
pub fn display_path(entry: &SuggestionEntry, resolver: &PathResolver) -> QualifiedName {
    let owner = entry.member_of().unwrap_or(&entry.defined_in);
    resolver.print_project_path(owner)
}

/// Locals and local functions are only visible inside their scope.
pub fn is_visible_at(entry: &SuggestionEntry, position: Position) -> bool {
    entry.scope().is_none_or(|scope| scope.contains(position))
}
