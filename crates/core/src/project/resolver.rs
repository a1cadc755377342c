//! Mapping between absolute qualified names and [`ProjectPath`]s.
//!
//! Names coming from the language server carry the literal project name. The
//! resolver folds the current project into `project = None`, so stored paths
//! survive a rename; printing resolves it back using the newest name.

use crate::error::{Result, SemscopeError};
use crate::model::{ProjectPath, QualifiedName};
use std::sync::{PoisonError, RwLock};

/// Number of segments of a project identifier: namespace and name.
const PROJECT_SEGMENTS: usize = 2;

#[derive(Debug, Clone)]
struct ProjectNames {
    /// Name the server has confirmed; used to interpret inbound names.
    confirmed: QualifiedName,
    /// Name requested locally but not yet confirmed; used for outbound names.
    pending: Option<QualifiedName>,
}

impl ProjectNames {
    fn outbound(&self) -> &QualifiedName {
        self.pending.as_ref().unwrap_or(&self.confirmed)
    }
}

/// Per-session resolver for the current project's identity.
#[derive(Debug)]
pub struct PathResolver {
    names: RwLock<ProjectNames>,
}

fn ensure_project_name(name: &QualifiedName) -> Result<()> {
    if name.segment_count() != PROJECT_SEGMENTS {
        return Err(SemscopeError::ProjectPath(name.to_string()));
    }
    Ok(())
}

impl PathResolver {
    pub fn new(project: QualifiedName) -> Result<Self> {
        ensure_project_name(&project)?;
        Ok(Self {
            names: RwLock::new(ProjectNames {
                confirmed: project,
                pending: None,
            }),
        })
    }

    fn names(&self) -> ProjectNames {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The server-confirmed project name.
    pub fn project_name(&self) -> QualifiedName {
        self.names().confirmed
    }

    /// The name new serializations use: pending if a rename is in flight.
    pub fn outbound_project_name(&self) -> QualifiedName {
        self.names().outbound().clone()
    }

    pub fn parse_project_path(&self, name: &QualifiedName) -> Result<ProjectPath> {
        let project = name
            .prefix(PROJECT_SEGMENTS)
            .ok_or_else(|| SemscopeError::ProjectPath(name.to_string()))?;
        let path = name.suffix(PROJECT_SEGMENTS);
        let project = if project == self.names().confirmed {
            None
        } else {
            Some(project)
        };
        Ok(ProjectPath::new(project, path))
    }

    pub fn parse_project_path_str(&self, name: &str) -> Result<ProjectPath> {
        self.parse_project_path(&QualifiedName::parse(name)?)
    }

    /// Absolute name for display and for source code, without `Main`.
    pub fn print_project_path(&self, path: &ProjectPath) -> QualifiedName {
        self.join(&path.normalized())
    }

    /// Absolute name in the form the server itself emits, `Main` included.
    pub fn serialize_project_path_for_backend(&self, path: &ProjectPath) -> QualifiedName {
        self.join(path)
    }

    fn join(&self, path: &ProjectPath) -> QualifiedName {
        let project = match &path.project {
            Some(project) => project.clone(),
            None => self.outbound_project_name(),
        };
        match &path.path {
            Some(inner) => project.join(inner),
            None => project,
        }
    }

    /// Start using `new_name` for outbound names before the server confirms.
    pub fn on_project_rename_requested(&self, new_name: QualifiedName) -> Result<()> {
        ensure_project_name(&new_name)?;
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("Project rename to {} requested", new_name);
        names.pending = Some(new_name);
        Ok(())
    }

    /// Confirm a rename reported by the server.
    ///
    /// Ignored unless `old_name` is the currently confirmed name, so a stale
    /// confirmation cannot clobber a newer rename. Returns whether the rename
    /// was applied.
    pub fn on_project_renamed(&self, old_name: &QualifiedName, new_name: QualifiedName) -> bool {
        if ensure_project_name(&new_name).is_err() {
            tracing::warn!("Ignoring rename to malformed project name {}", new_name);
            return false;
        }
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        if &names.confirmed != old_name {
            tracing::warn!(
                "Ignoring rename {} -> {}: current project is {}",
                old_name,
                new_name,
                names.confirmed
            );
            return false;
        }
        tracing::info!("Project renamed {} -> {}", old_name, new_name);
        names.confirmed = new_name;
        names.pending = None;
        true
    }
}
