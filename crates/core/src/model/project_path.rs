use super::qualified_name::{Identifier, QualifiedName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the implicit top-level module of every project.
pub const MAIN_MODULE: &str = "Main";

/// A qualified name split into its owning project and a path inside it.
///
/// `project = None` stands for the current project, so the value stays valid
/// when the project is renamed. `path = None` is the project itself.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProjectPath {
    pub project: Option<QualifiedName>,
    pub path: Option<QualifiedName>,
}

impl ProjectPath {
    pub fn new(project: Option<QualifiedName>, path: Option<QualifiedName>) -> Self {
        Self { project, path }
    }

    /// A path inside the current project.
    pub fn local(path: Option<QualifiedName>) -> Self {
        Self {
            project: None,
            path,
        }
    }

    /// The root of an explicitly named project (e.g. a library).
    pub fn library(project: QualifiedName) -> Self {
        Self {
            project: Some(project),
            path: None,
        }
    }

    pub fn with_project(&self, project: Option<QualifiedName>) -> ProjectPath {
        Self {
            project,
            path: self.path.clone(),
        }
    }

    pub fn is_current_project(&self) -> bool {
        self.project.is_none()
    }

    pub fn is_project_root(&self) -> bool {
        self.path.is_none()
    }

    /// Drop a leading `Main` segment: `Main` and the project itself name the
    /// same module.
    pub fn normalized(&self) -> ProjectPath {
        let path = match &self.path {
            Some(path) if path.first() == MAIN_MODULE => path.suffix(1),
            other => other.clone(),
        };
        Self {
            project: self.project.clone(),
            path,
        }
    }

    pub fn append(&self, segment: &Identifier) -> ProjectPath {
        let path = match &self.path {
            Some(path) => path.append(segment),
            None => QualifiedName::from(segment.clone()),
        };
        Self {
            project: self.project.clone(),
            path: Some(path),
        }
    }

    /// The path without its last segment. The project root has no parent.
    pub fn parent(&self) -> Option<ProjectPath> {
        let path = self.path.as_ref()?;
        Some(Self {
            project: self.project.clone(),
            path: path.parent(),
        })
    }

    /// The last path segment; `None` for the project root, whose name is
    /// owned by the project identity.
    pub fn last_segment(&self) -> Option<Identifier> {
        self.path.as_ref().map(QualifiedName::last_identifier)
    }

    /// Join project and path without resolving the current project.
    /// Only meaningful when `project` is set.
    pub fn to_qualified_name(&self) -> Option<QualifiedName> {
        let project = self.project.as_ref()?;
        Some(match &self.path {
            Some(path) => project.join(path),
            None => project.clone(),
        })
    }
}

impl fmt::Debug for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let project = self
            .project
            .as_ref()
            .map(QualifiedName::as_str)
            .unwrap_or("<current>");
        match &self.path {
            Some(path) => write!(f, "ProjectPath({project}::{path})"),
            None => write!(f, "ProjectPath({project})"),
        }
    }
}
